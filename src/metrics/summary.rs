use std::time::Duration;

use super::{LatencyStats, MetricRecord, MetricsSummary, ScenarioSummary};

const PERCENTILE_P50: f64 = 50.0;
const PERCENTILE_P95: f64 = 95.0;
const PERCENTILE_P99: f64 = 99.0;
const PERCENT: f64 = 100.0;
const MILLIS_PER_SECOND: f64 = 1000.0;

#[derive(Default)]
struct Tally {
    total: u64,
    failed: u64,
    latencies: Vec<f64>,
}

impl Tally {
    fn add(&mut self, record: &MetricRecord) {
        self.total = self.total.saturating_add(1);
        if !record.success {
            self.failed = self.failed.saturating_add(1);
        }
        self.latencies.push(record.latency_ms);
    }
}

/// Aggregates a record set over a run that lasted `elapsed`.
#[must_use]
pub fn summarize(records: &[MetricRecord], elapsed: Duration) -> MetricsSummary {
    let seconds = elapsed.as_secs_f64();
    let mut overall = Tally::default();
    let mut per_scenario: Vec<(&str, Tally)> = Vec::new();

    for record in records {
        overall.add(record);
        if let Some((_, tally)) = per_scenario
            .iter_mut()
            .find(|(name, _)| *name == record.scenario)
        {
            tally.add(record);
        } else {
            let mut tally = Tally::default();
            tally.add(record);
            per_scenario.push((record.scenario.as_str(), tally));
        }
    }

    let scenarios = per_scenario
        .into_iter()
        .map(|(name, tally)| ScenarioSummary {
            name: name.to_owned(),
            total_requests: tally.total,
            successful_requests: tally.total.saturating_sub(tally.failed),
            failed_requests: tally.failed,
            error_rate: error_rate(tally.failed, tally.total),
            requests_per_sec: requests_per_sec(tally.total, seconds),
            latency: latency_stats(tally.latencies),
        })
        .collect();

    MetricsSummary {
        total_requests: overall.total,
        successful_requests: overall.total.saturating_sub(overall.failed),
        failed_requests: overall.failed,
        error_rate: error_rate(overall.failed, overall.total),
        requests_per_sec: requests_per_sec(overall.total, seconds),
        latency: latency_stats(overall.latencies),
        duration_seconds: seconds,
        scenarios,
    }
}

/// Linear interpolation between the order statistics of an ascending slice.
/// Returns `0.0` for an empty slice.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "percentile interpolation works on fractional ranks"
)]
pub fn percentile(sorted: &[f64], percent: f64) -> f64 {
    let Some((&first, rest)) = sorted.split_first() else {
        return 0.0;
    };
    if rest.is_empty() {
        return first;
    }

    let last_index = sorted.len().saturating_sub(1);
    let rank = (percent / PERCENT).clamp(0.0, 1.0) * last_index as f64;
    let lower = rank.floor();
    let index = lower as usize;
    let fraction = rank - lower;

    match (sorted.get(index), sorted.get(index.saturating_add(1))) {
        (Some(&low), Some(&high)) => low + fraction * (high - low),
        (Some(&low), None) => low,
        (None, _) => sorted.last().copied().unwrap_or(first),
    }
}

/// Converts an elapsed duration to fractional milliseconds.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "latencies are reported in fractional ms")]
pub fn duration_to_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * MILLIS_PER_SECOND
}

#[expect(clippy::float_arithmetic, reason = "mean latency")]
fn latency_stats(mut latencies: Vec<f64>) -> LatencyStats {
    if latencies.is_empty() {
        return LatencyStats::default();
    }
    latencies.sort_unstable_by(f64::total_cmp);

    let sum: f64 = latencies.iter().sum();
    LatencyStats {
        min_ms: latencies.first().copied().unwrap_or_default(),
        max_ms: latencies.last().copied().unwrap_or_default(),
        avg_ms: sum / latencies.len() as f64,
        p50_ms: percentile(&latencies, PERCENTILE_P50),
        p95_ms: percentile(&latencies, PERCENTILE_P95),
        p99_ms: percentile(&latencies, PERCENTILE_P99),
    }
}

#[expect(clippy::float_arithmetic, reason = "percentage of failed requests")]
fn error_rate(failed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    failed as f64 / total as f64 * PERCENT
}

/// Requests per second over `seconds`; `0.0` when no time has passed.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "throughput over fractional seconds")]
pub fn requests_per_sec(total: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        total as f64 / seconds
    } else {
        0.0
    }
}
