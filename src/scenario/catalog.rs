//! Static scenario catalog and the tag to category table
//!
//! Every location, weapon rule and fight format carries the rating
//! categories it stresses. A vote fought under a scenario updates the union
//! of its tags' categories on top of the overall rating.

use crate::types::StatCategory;
use crate::types::StatCategory::{
    Assassination, BattleIq, BladedWeapons, Durability, Firearms, HandToHand, Speed, Stamina,
};
use serde::Serialize;
use std::collections::BTreeSet;

/// Which part of a scenario a tag describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Location,
    Weapon,
    Format,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Location => write!(f, "location"),
            TagKind::Weapon => write!(f, "weapon"),
            TagKind::Format => write!(f, "format"),
        }
    }
}

/// A situational tag with the categories it affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioTag {
    pub id: &'static str,
    pub name: &'static str,
    pub categories: &'static [StatCategory],
}

const fn tag(
    id: &'static str,
    name: &'static str,
    categories: &'static [StatCategory],
) -> ScenarioTag {
    ScenarioTag {
        id,
        name,
        categories,
    }
}

pub const LOCATIONS: &[ScenarioTag] = &[
    tag("forest", "Dense Forest", &[Assassination, BattleIq]),
    tag("enclosed", "Enclosed Room (10x10m)", &[HandToHand, Durability]),
    tag("open_field", "Open Field", &[Firearms, Speed]),
    tag("urban", "Urban Street (Night)", &[BattleIq, Assassination]),
    tag("rooftop", "Rooftop (Rain)", &[HandToHand, Speed]),
    tag("underground", "Underground Bunker", &[HandToHand, BladedWeapons]),
    tag("corridor", "Narrow Corridor", &[HandToHand, BladedWeapons]),
    tag("warehouse", "Abandoned Warehouse", &[BattleIq, Assassination]),
    tag(
        "shipping_container",
        "Shipping Container Maze",
        &[Assassination, BattleIq],
    ),
    tag("moving_train", "Moving Train Top", &[BattleIq, Speed]),
    tag("elevator", "Elevator (Restricted)", &[HandToHand, Durability]),
];

pub const WEAPONS: &[ScenarioTag] = &[
    tag("no_weapons", "No Weapons (Fists Only)", &[HandToHand, Durability]),
    tag("bladed_only", "Bladed Weapons Only", &[BladedWeapons, Speed]),
    tag("firearms_available", "Firearms Available", &[Firearms]),
    tag("limited_ammo", "Limited Ammo (1 Mag)", &[Firearms, BattleIq]),
    tag("improvised_weapons", "Improvised Weapons", &[BattleIq, HandToHand]),
    tag(
        "full_arsenal",
        "Full Arsenal",
        &[BattleIq, Firearms, BladedWeapons],
    ),
    tag("sniper_rifle", "Sniper Rifles (Start 1km)", &[Firearms, BattleIq]),
    tag("dual_knives", "Dual Combat Knives", &[BladedWeapons, Speed]),
];

pub const FORMATS: &[ScenarioTag] = &[
    tag("1v1", "1 vs 1 Duel", &[HandToHand, Durability]),
    tag("with_minions", "With 5 Minions Each", &[BattleIq]),
    tag("ambush", "Ambush (One side attacks)", &[Assassination, BattleIq]),
    tag("assassination", "Assassination Attempt", &[Assassination, BattleIq]),
    tag("prolonged_battle", "Prolonged Battle (Stamina)", &[Stamina, Durability]),
    tag("blitz_attack", "Blitz Attack", &[Assassination, Speed]),
    tag("cage_match", "Cage Match (No Escape)", &[HandToHand, Durability]),
    tag("protect_vip", "Protect VIP", &[BattleIq, Durability]),
    tag("nightmare", "Nightmare Fuel (Injured Start)", &[Stamina, BattleIq]),
    tag("car_chase", "High Speed Car Chase", &[Firearms, BattleIq]),
    tag("pitch_black", "Pitch Black (No Vision)", &[Assassination, BattleIq]),
    tag("sniper_duel", "Sniper Duel", &[Firearms, BattleIq]),
    tag("battle_royale", "Chaos (Interference allowed)", &[Stamina, BattleIq]),
];

/// Tags of one kind
pub fn tags_of(kind: TagKind) -> &'static [ScenarioTag] {
    match kind {
        TagKind::Location => LOCATIONS,
        TagKind::Weapon => WEAPONS,
        TagKind::Format => FORMATS,
    }
}

/// Find a tag of a given kind by id
pub fn find_tag(kind: TagKind, id: &str) -> Option<&'static ScenarioTag> {
    tags_of(kind).iter().find(|tag| tag.id == id)
}

/// Categories a tag stresses; unknown tags stress nothing
pub fn categories_for(id: &str) -> &'static [StatCategory] {
    LOCATIONS
        .iter()
        .chain(WEAPONS)
        .chain(FORMATS)
        .find(|tag| tag.id == id)
        .map(|tag| tag.categories)
        .unwrap_or(&[])
}

/// Union of the categories of every tag, deduplicated
///
/// Unknown tags contribute nothing. `Overall` never appears in the table;
/// it is updated on every vote regardless.
pub fn resolve_affected_categories<I, S>(tags: I) -> BTreeSet<StatCategory>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .flat_map(|tag| categories_for(tag.as_ref()).iter().copied())
        .collect()
}
