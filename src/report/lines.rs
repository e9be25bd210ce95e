use super::LoadTestResult;

/// Narrowest scenario name column.
const MIN_NAME_WIDTH: usize = 8;

/// Plain text report, one entry per line, without colors.
#[must_use]
pub fn summary_lines(result: &LoadTestResult) -> Vec<String> {
    let summary = &result.summary;
    let latency = &summary.latency;
    let mut lines = Vec::new();

    lines.push("LoadForge Load Test Report".to_owned());
    lines.push(format!("Test: {}", result.test_name));
    lines.push(format!(
        "Duration: {:.1}s | Users: {} | Ramp-up: {}s",
        summary.duration_seconds, result.users, result.ramp_up_seconds
    ));
    lines.push(String::new());

    if let Some(auth) = result.auth() {
        let status = if auth.success { "PASS" } else { "FAIL" };
        lines.push(format!(
            "Auth: {} ({} {}, {:.1}ms)",
            status, auth.method, auth.endpoint, auth.elapsed_ms
        ));
        if let Some(error) = auth.error.as_deref() {
            lines.push(format!("  {}", error));
        }
        lines.push(String::new());
    }

    lines.push("Throughput:".to_owned());
    lines.push(format!("  Total requests: {}", summary.total_requests));
    lines.push(format!("  Requests/sec:   {:.1}", summary.requests_per_sec));
    lines.push(String::new());

    lines.push("Latency (ms):".to_owned());
    lines.push(format!(
        "  Min: {:<8.1} Avg: {:<8.1} p50: {:<8.1}",
        latency.min_ms, latency.avg_ms, latency.p50_ms
    ));
    lines.push(format!(
        "  p95: {:<8.1} p99: {:<8.1} Max: {:<8.1}",
        latency.p95_ms, latency.p99_ms, latency.max_ms
    ));
    lines.push(String::new());

    lines.push("Errors:".to_owned());
    lines.push(format!(
        "  Error rate: {:.1}% ({}/{})",
        summary.error_rate, summary.failed_requests, summary.total_requests
    ));
    lines.push(String::new());

    let scenarios = result.scenarios();
    if !scenarios.is_empty() {
        let width = scenarios
            .iter()
            .map(|scenario| scenario.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(MIN_NAME_WIDTH);
        lines.push("Per-scenario breakdown:".to_owned());
        for scenario in scenarios {
            lines.push(format!(
                "  {:<width$}  reqs: {:>6}  rps: {:>6.1}  p95: {:>7.1}ms  err: {:.1}%",
                scenario.name,
                scenario.total_requests,
                scenario.requests_per_sec,
                scenario.latency.p95_ms,
                scenario.error_rate,
                width = width
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Result: {}",
        if result.success() { "PASS" } else { "FAIL" }
    ));
    lines
}
