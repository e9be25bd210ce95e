use tokio::time::Instant;
use tracing::warn;

use crate::{
    error::{AssertionFailure, StepError},
    metrics::{MetricsCollector, RecordHandle, RequestSample, duration_to_ms},
    model::HttpMethod,
};

use super::assertions::{check_json, check_status};
use super::plan::{PlannedStep, ScenarioPlan};
use super::transport::{HttpRequest, HttpResponse, Transport};

/// What one pass over a scenario's steps produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationOutcome {
    pub requests: usize,
    /// Text of the transport error or assertion that ended the iteration.
    pub failure: Option<String>,
}

impl IterationOutcome {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

struct Cursor {
    response: HttpResponse,
    handle: RecordHandle,
}

/// Runs every step of `plan` once, in order, recording each request.
///
/// Transport errors and assertion failures end the iteration and are written
/// into the collector; they are not returned as errors.
///
/// # Errors
///
/// Returns `NoResponseYet` when an expectation runs before any request.
pub async fn run_scenario_iteration(
    transport: &dyn Transport,
    plan: &ScenarioPlan,
    collector: &MetricsCollector,
) -> Result<IterationOutcome, StepError> {
    let mut outcome = IterationOutcome::default();
    let mut cursor: Option<Cursor> = None;

    for step in plan.steps() {
        let assertion = match step {
            PlannedStep::Request { method, path } => {
                outcome.requests = outcome.requests.saturating_add(1);
                match issue(transport, plan.name(), *method, path, collector).await {
                    Ok(next) => {
                        cursor = Some(next);
                        continue;
                    }
                    Err(message) => {
                        outcome.failure = Some(message);
                        return Ok(outcome);
                    }
                }
            }
            PlannedStep::ExpectStatus { code } => {
                let current = current_response(cursor.as_ref(), plan, "expect status")?;
                check_status(*code, current.response.status)
            }
            PlannedStep::ExpectJson(expectation) => {
                let current = current_response(cursor.as_ref(), plan, "expect json")?;
                current
                    .response
                    .json()
                    .map_err(|err| AssertionFailure::InvalidJsonBody {
                        message: err.to_string(),
                    })
                    .and_then(|body| check_json(&body, expectation))
            }
        };

        if let Err(failure) = assertion {
            let message = failure.to_string();
            warn!("Scenario '{}' assertion failed: {}", plan.name(), message);
            if let Some(current) = cursor.as_ref() {
                collector.mark_failed(current.handle, message.clone());
            }
            outcome.failure = Some(message);
            return Ok(outcome);
        }
    }

    Ok(outcome)
}

async fn issue(
    transport: &dyn Transport,
    scenario: &str,
    method: HttpMethod,
    path: &str,
    collector: &MetricsCollector,
) -> Result<Cursor, String> {
    let started = Instant::now();
    let result = transport.execute(HttpRequest::new(method, path)).await;
    let latency_ms = duration_to_ms(started.elapsed());

    match result {
        Ok(response) => {
            let handle = collector.record(RequestSample {
                scenario: scenario.to_owned(),
                method,
                path: path.to_owned(),
                latency_ms,
                status_code: response.status,
                success: true,
                error: None,
            });
            Ok(Cursor { response, handle })
        }
        Err(err) => {
            let message = err.to_string();
            warn!("Scenario '{}' {} {} failed: {}", scenario, method, path, message);
            collector.record(RequestSample {
                scenario: scenario.to_owned(),
                method,
                path: path.to_owned(),
                latency_ms,
                status_code: 0,
                success: false,
                error: Some(message.clone()),
            });
            Err(message)
        }
    }
}

fn current_response<'cursor>(
    cursor: Option<&'cursor Cursor>,
    plan: &ScenarioPlan,
    step: &'static str,
) -> Result<&'cursor Cursor, StepError> {
    cursor.ok_or_else(|| StepError::NoResponseYet {
        scenario: plan.name().to_owned(),
        step,
    })
}
