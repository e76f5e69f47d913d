//! Metrics and monitoring for the castle-ranker service
//!
//! Prometheus collectors for votes, roster and storage activity plus the
//! HTTP server exposing probes and the scrape endpoint.

pub mod collector;
pub mod health;

pub use collector::{
    MetricsCollector, MetricsTimer, RosterMetrics, ServiceMetrics, StorageMetrics, VoteMetrics,
};
pub use health::{HealthServer, HealthServerConfig};
