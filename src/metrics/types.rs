use std::time::Duration;

use serde::Serialize;

use crate::model::HttpMethod;

/// One issued request as reported by a virtual user.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSample {
    pub scenario: String,
    pub method: HttpMethod,
    pub path: String,
    pub latency_ms: f64,
    /// `0` when the transport failed before a status was received.
    pub status_code: u16,
    pub success: bool,
    pub error: Option<String>,
}

/// A stored request outcome. Only `success` and `error` may change after the
/// record is appended, and only through `MetricsCollector::mark_failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub scenario: String,
    pub method: HttpMethod,
    pub path: String,
    /// Offset from the start of the run.
    pub timestamp: Duration,
    pub latency_ms: f64,
    pub status_code: u16,
    pub success: bool,
    pub error: Option<String>,
}

/// Position of an appended record, returned by `MetricsCollector::record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle(pub(super) usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percentage in `0.0..=100.0`.
    pub error_rate: f64,
    pub latency: LatencyStats,
    pub requests_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub error_rate: f64,
    pub latency: LatencyStats,
    pub requests_per_sec: f64,
    pub duration_seconds: f64,
    /// In first-seen scenario order.
    pub scenarios: Vec<ScenarioSummary>,
}

impl MetricsSummary {
    /// The summary of a run that issued no requests.
    #[must_use]
    pub fn empty(elapsed: Duration) -> Self {
        super::summarize(&[], elapsed)
    }
}
