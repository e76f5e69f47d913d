//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the castle-ranker service:
//! vote throughput and rating movement, roster size, and storage health.

use crate::types::VoteResult;
use anyhow::Result;
use prometheus::core::Collector;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ranking service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Vote and rating metrics
    vote_metrics: VoteMetrics,

    /// Roster lifecycle metrics
    roster_metrics: RosterMetrics,

    /// Storage backend metrics
    storage_metrics: StorageMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// Vote and rating metrics
#[derive(Clone)]
pub struct VoteMetrics {
    /// Votes recorded, labelled `upset` when the lower-rated side won
    pub votes_total: IntCounterVec,

    /// Overall rating points moved per vote
    pub rating_change: Histogram,

    /// Category rating updates applied
    pub category_updates_total: IntCounterVec,

    /// End-to-end vote processing time
    pub vote_duration: Histogram,
}

/// Roster lifecycle metrics
#[derive(Clone)]
pub struct RosterMetrics {
    /// Characters currently in the roster
    pub roster_size: IntGauge,

    /// Characters created (new entries and new versions)
    pub characters_created_total: IntCounter,

    /// Characters deleted
    pub characters_deleted_total: IntCounter,
}

/// Storage backend metrics
#[derive(Clone)]
pub struct StorageMetrics {
    /// Storage operations by operation and status
    pub operations_total: IntCounterVec,

    /// Storage operation durations
    pub operation_duration: HistogramVec,

    /// Operations served by the local cache after a primary failure
    pub fallbacks_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let vote_metrics = VoteMetrics::new(&registry)?;
        let roster_metrics = RosterMetrics::new(&registry)?;
        let storage_metrics = StorageMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            vote_metrics,
            roster_metrics,
            storage_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn votes(&self) -> &VoteMetrics {
        &self.vote_metrics
    }

    pub fn roster(&self) -> &RosterMetrics {
        &self.roster_metrics
    }

    pub fn storage(&self) -> &StorageMetrics {
        &self.storage_metrics
    }

    /// Record an applied vote
    ///
    /// `upset` marks votes where the winner entered with the lower overall rating.
    pub fn record_vote(&self, result: &VoteResult, upset: bool, duration: Duration) {
        let kind = if upset { "upset" } else { "expected" };

        self.vote_metrics.votes_total.with_label_values(&[kind]).inc();
        self.vote_metrics
            .rating_change
            .observe(f64::from(result.overall_change));

        for change in &result.category_changes {
            self.vote_metrics
                .category_updates_total
                .with_label_values(&[change.category.as_str()])
                .inc();
        }

        self.vote_metrics
            .vote_duration
            .observe(duration.as_secs_f64());
    }

    pub fn record_character_created(&self) {
        self.roster_metrics.characters_created_total.inc();
        self.roster_metrics.roster_size.inc();
    }

    pub fn record_character_deleted(&self) {
        self.roster_metrics.characters_deleted_total.inc();
        self.roster_metrics.roster_size.dec();
    }

    /// Overwrite the roster size gauge, e.g. after seeding or a reset
    pub fn set_roster_size(&self, size: usize) {
        self.roster_metrics.roster_size.set(size as i64);
    }

    /// Record a storage operation
    pub fn record_storage_operation(&self, operation: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.storage_metrics
            .operations_total
            .with_label_values(&[operation, status])
            .inc();

        self.storage_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record an operation that degraded to the local cache
    pub fn record_storage_fallback(&self, operation: &str) {
        self.storage_metrics
            .fallbacks_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Operations served by the local cache so far, across all operations
    pub fn total_storage_fallbacks(&self) -> u64 {
        self.storage_metrics
            .fallbacks_total
            .collect()
            .iter()
            .flat_map(|family| family.get_metric().iter())
            .map(|metric| metric.get_counter().get_value() as u64)
            .sum()
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("castle_ranker_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "castle_ranker_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("castle_ranker_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
        })
    }
}

impl VoteMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let votes_total = IntCounterVec::new(
            Opts::new("castle_ranker_votes_total", "Total votes recorded"),
            &["result"],
        )?;
        registry.register(Box::new(votes_total.clone()))?;

        let rating_change = Histogram::with_opts(
            HistogramOpts::new(
                "castle_ranker_rating_change_points",
                "Overall rating points moved per vote",
            )
            .buckets(vec![0.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0]),
        )?;
        registry.register(Box::new(rating_change.clone()))?;

        let category_updates_total = IntCounterVec::new(
            Opts::new(
                "castle_ranker_category_updates_total",
                "Category rating updates applied",
            ),
            &["category"],
        )?;
        registry.register(Box::new(category_updates_total.clone()))?;

        let vote_duration = Histogram::with_opts(
            HistogramOpts::new(
                "castle_ranker_vote_duration_seconds",
                "Vote processing time",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(vote_duration.clone()))?;

        Ok(Self {
            votes_total,
            rating_change,
            category_updates_total,
            vote_duration,
        })
    }
}

impl RosterMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let roster_size = IntGauge::new("castle_ranker_roster_size", "Characters in the roster")?;
        registry.register(Box::new(roster_size.clone()))?;

        let characters_created_total = IntCounter::new(
            "castle_ranker_characters_created_total",
            "Total characters created",
        )?;
        registry.register(Box::new(characters_created_total.clone()))?;

        let characters_deleted_total = IntCounter::new(
            "castle_ranker_characters_deleted_total",
            "Total characters deleted",
        )?;
        registry.register(Box::new(characters_deleted_total.clone()))?;

        Ok(Self {
            roster_size,
            characters_created_total,
            characters_deleted_total,
        })
    }
}

impl StorageMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operations_total = IntCounterVec::new(
            Opts::new(
                "castle_ranker_storage_operations_total",
                "Total storage operations",
            ),
            &["operation", "status"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "castle_ranker_storage_operation_duration_seconds",
                "Storage operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let fallbacks_total = IntCounterVec::new(
            Opts::new(
                "castle_ranker_storage_fallbacks_total",
                "Storage operations served by the local cache",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(fallbacks_total.clone()))?;

        Ok(Self {
            operations_total,
            operation_duration,
            fallbacks_total,
        })
    }
}
