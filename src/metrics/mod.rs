//! Request outcome collection and summary statistics.
mod collector;
mod summary;
mod types;


pub use collector::MetricsCollector;
pub use summary::{duration_to_ms, percentile, requests_per_sec, summarize};
pub use types::{
    LatencyStats, MetricRecord, MetricsSummary, RecordHandle, RequestSample, ScenarioSummary,
};
