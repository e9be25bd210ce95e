use serde::Serialize;

use crate::http::PreflightReport;
use crate::metrics::{MetricsSummary, ScenarioSummary, duration_to_ms};
use crate::model::HttpMethod;

/// How the auth preflight went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthOutcome {
    pub endpoint: String,
    pub method: HttpMethod,
    pub elapsed_ms: f64,
    pub success: bool,
    pub error: Option<String>,
}

impl From<&PreflightReport> for AuthOutcome {
    fn from(report: &PreflightReport) -> Self {
        Self {
            endpoint: report.endpoint.clone(),
            method: report.method,
            elapsed_ms: duration_to_ms(report.elapsed),
            success: report.token.is_ok(),
            error: report.token.as_ref().err().map(ToString::to_string),
        }
    }
}

/// The user count and timing a run was configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunShape {
    pub users: u64,
    pub users_spawned: u64,
    pub ramp_up_seconds: u64,
    pub target_duration_seconds: u64,
}

/// Terminal artifact of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadTestResult {
    pub test_name: String,
    pub users: u64,
    /// Virtual users actually started; `0` when the preflight failed.
    pub users_spawned: u64,
    pub ramp_up_seconds: u64,
    pub target_duration_seconds: u64,
    pub summary: MetricsSummary,
    pub auth: Option<AuthOutcome>,
}

impl LoadTestResult {
    /// Auth did not fail and no request failed.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.auth_failed() && self.summary.failed_requests == 0
    }

    #[must_use]
    pub fn auth_failed(&self) -> bool {
        self.auth.as_ref().is_some_and(|auth| !auth.success)
    }

    #[must_use]
    pub const fn total_requests(&self) -> u64 {
        self.summary.total_requests
    }

    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.summary.failed_requests
    }

    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioSummary] {
        &self.summary.scenarios
    }

    #[must_use]
    pub const fn auth(&self) -> Option<&AuthOutcome> {
        self.auth.as_ref()
    }
}

/// Combines already computed pieces into the final result. Performs no I/O.
#[must_use]
pub fn assemble_result(
    test_name: &str,
    shape: RunShape,
    summary: MetricsSummary,
    auth: Option<AuthOutcome>,
) -> LoadTestResult {
    LoadTestResult {
        test_name: test_name.to_owned(),
        users: shape.users,
        users_spawned: shape.users_spawned,
        ramp_up_seconds: shape.ramp_up_seconds,
        target_duration_seconds: shape.target_duration_seconds,
        summary,
        auth,
    }
}
