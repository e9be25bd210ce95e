use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::{MetricRecord, MetricsSummary, RecordHandle, RequestSample, summarize};

#[derive(Debug, Default)]
struct CollectorState {
    records: Vec<MetricRecord>,
    failed: u64,
    finished: Option<Instant>,
}

/// Append-only store of request outcomes shared by every virtual user of a run.
///
/// Appends and the paired failure patch go through one mutex so a handle
/// always names the record its own request produced, whatever the runtime's
/// threading model.
#[derive(Debug)]
pub struct MetricsCollector {
    started: Instant,
    state: Mutex<CollectorState>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Creates a collector whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            state: Mutex::new(CollectorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one request outcome and returns its handle.
    pub fn record(&self, sample: RequestSample) -> RecordHandle {
        let timestamp = self.started.elapsed();
        let mut state = self.state();
        if !sample.success {
            state.failed = state.failed.saturating_add(1);
        }
        let handle = RecordHandle(state.records.len());
        state.records.push(MetricRecord {
            scenario: sample.scenario,
            method: sample.method,
            path: sample.path,
            timestamp,
            latency_ms: sample.latency_ms,
            status_code: sample.status_code,
            success: sample.success,
            error: sample.error,
        });
        handle
    }

    /// Flips the record behind `handle` to failed and stores the error text.
    /// Unknown handles are ignored.
    pub fn mark_failed(&self, handle: RecordHandle, error: String) {
        let mut state = self.state();
        let Some(record) = state.records.get_mut(handle.0) else {
            tracing::warn!("Ignoring failure for unknown record {}", handle.0);
            return;
        };
        let newly_failed = record.success;
        record.success = false;
        record.error = Some(error);
        if newly_failed {
            state.failed = state.failed.saturating_add(1);
        }
    }

    /// Freezes the elapsed time used by `summary`. Later calls are ignored.
    pub fn stop(&self) {
        let mut state = self.state();
        if state.finished.is_none() {
            state.finished = Some(Instant::now());
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let finished = self.state().finished;
        finished.map_or_else(
            || self.started.elapsed(),
            |end| end.saturating_duration_since(self.started),
        )
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        u64::try_from(self.state().records.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn failed_requests(&self) -> u64 {
        self.state().failed
    }

    /// Copies the current record set.
    #[must_use]
    pub fn records(&self) -> Vec<MetricRecord> {
        self.state().records.clone()
    }

    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let elapsed = self.elapsed();
        let state = self.state();
        summarize(&state.records, elapsed)
    }
}
