//! Performance benchmarks for rating calculations

use castle_ranker::metrics::MetricsCollector;
use castle_ranker::rating::{classify_tier, EloConfig, EloEngine, InMemoryCharacterStore, VoteContext};
use castle_ranker::roster::{RosterManager, RosterSettings, VoteRequest};
use castle_ranker::scenario::resolve_affected_categories;
use castle_ranker::types::{Character, CharacterProfile};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn bench_character(id: &str, baseline: i32) -> Character {
    Character::from_profile(
        id.to_string(),
        CharacterProfile {
            name: id.to_string(),
            version: "Current".to_string(),
            faction: "Bench".to_string(),
            image_url: String::new(),
            description: String::new(),
            wiki_link: None,
        },
        baseline,
    )
}

async fn create_bench_system() -> RosterManager {
    let manager = RosterManager::new(
        Arc::new(InMemoryCharacterStore::new()),
        EloConfig::default(),
        RosterSettings::default(),
        Arc::new(MetricsCollector::new().unwrap()),
    )
    .unwrap();
    manager.seed_default_roster().await.unwrap();
    manager
}

fn bench_rating_calculations(c: &mut Criterion) {
    let engine = EloEngine::default();
    let winner = bench_character("winner", 1400);
    let loser = bench_character("loser", 1650);
    let affected = resolve_affected_categories(["enclosed", "dual_knives", "cage_match"]);

    c.bench_function("apply_vote_with_scenario", |b| {
        b.iter(|| {
            black_box(engine.apply_vote(
                black_box(&winner),
                black_box(&loser),
                &affected,
                VoteContext::now(),
            ))
        })
    });

    c.bench_function("classify_tier", |b| {
        b.iter(|| {
            for rating in (0..2600).step_by(50) {
                black_box(classify_tier(black_box(rating as f64)));
            }
        })
    });

    c.bench_function("resolve_affected_categories", |b| {
        b.iter(|| {
            black_box(resolve_affected_categories(black_box([
                "forest",
                "firearms_available",
                "1v1",
            ])))
        })
    });
}

fn bench_single_vote(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let manager = rt.block_on(create_bench_system());

    c.bench_function("single_vote", |b| {
        b.iter(|| {
            rt.block_on(async {
                let request = VoteRequest::new("gustav", "aquila").with_tags(["enclosed"]);
                black_box(manager.record_vote(request).await.unwrap())
            })
        })
    });
}

fn bench_roster_queries(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let manager = rt.block_on(create_bench_system());

    c.bench_function("tier_list", |b| {
        b.iter(|| rt.block_on(async { black_box(manager.tier_list().await.unwrap()) }))
    });

    c.bench_function("factions", |b| {
        b.iter(|| rt.block_on(async { black_box(manager.factions().await.unwrap()) }))
    });
}

criterion_group!(
    benches,
    bench_rating_calculations,
    bench_single_vote,
    bench_roster_queries
);
criterion_main!(benches);
