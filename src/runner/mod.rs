//! Run pipeline: context resolution, auth preflight, scheduling, and result
//! assembly.
mod mode;
mod orchestrator;
mod progress;


use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::{
    context::{merge_contexts, resolve_environment_from, resolve_target, resolve_variables},
    error::{AppError, AppResult, ConfigError},
    http::{ClientOptions, Connector, ReqwestConnector, compile_scenarios, run_auth_preflight},
    metrics::{MetricsCollector, MetricsSummary},
    model::{AUTH_TOKEN_KEY, TestDefinition},
    report::{AuthOutcome, LoadTestResult, assemble_result},
    shutdown::ShutdownSender,
};

pub use mode::RunMode;
pub use orchestrator::{LoadInputs, run_load};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default wait for virtual users after the stop signal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);
/// Default spacing of progress lines in continuous runs.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub request_timeout: Duration,
    pub grace_period: Duration,
    pub progress_interval: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Runs a test against real HTTP endpoints, reading environment bindings from
/// the process environment.
///
/// # Errors
///
/// Returns configuration errors (and transport construction errors) before any
/// request is issued. Per-request problems are reported in the result.
pub async fn run_test(
    definition: &TestDefinition,
    settings: &RunSettings,
    shutdown_tx: &ShutdownSender,
) -> AppResult<LoadTestResult> {
    run_test_with(
        definition,
        settings,
        |key| std::env::var(key).ok(),
        &ReqwestConnector,
        shutdown_tx,
    )
    .await
}

/// `run_test` with an explicit environment lookup and transport factory.
///
/// # Errors
///
/// Same as `run_test`.
pub async fn run_test_with<F>(
    definition: &TestDefinition,
    settings: &RunSettings,
    env_lookup: F,
    connector: &dyn Connector,
    shutdown_tx: &ShutdownSender,
) -> AppResult<LoadTestResult>
where
    F: Fn(&str) -> Option<String>,
{
    let test_name = definition.display_name().to_owned();

    let environment = resolve_environment_from(&definition.environment, env_lookup)?;
    let variables = resolve_variables(&definition.variables, &environment)?;
    let mut context = merge_contexts(environment, variables)?;
    if definition.auth.is_some() && context.contains(AUTH_TOKEN_KEY) {
        return Err(AppError::config(ConfigError::ReservedNameConflict {
            name: AUTH_TOKEN_KEY,
        }));
    }

    let base_url = resolve_target(definition.target.as_ref(), &context)?
        .filter(|target| !target.trim().is_empty())
        .ok_or(ConfigError::MissingTarget)?;
    let mode = RunMode::from_profile(definition.load.as_ref());
    info!("Running '{}' against {}", test_name, base_url);

    let mut options = ClientOptions::new(base_url, settings.request_timeout);
    let mut auth_outcome = None;

    if let Some(auth) = definition.auth.as_ref() {
        let login_transport = connector.connect(&options)?;
        let report = run_auth_preflight(login_transport.as_ref(), auth, &context).await;
        let outcome = AuthOutcome::from(&report);
        match report.token {
            Ok(token) => {
                info!("Auth preflight succeeded in {:?}", report.elapsed);
                options = options.with_bearer(&token);
                context.insert_reserved(AUTH_TOKEN_KEY, token)?;
                auth_outcome = Some(outcome);
            }
            Err(err) => {
                error!("Auth preflight failed: {}", err);
                return Ok(assemble_result(
                    &test_name,
                    mode.shape(0),
                    MetricsSummary::empty(Duration::ZERO),
                    Some(outcome),
                ));
            }
        }
    }

    let plans = compile_scenarios(&definition.scenarios, &context)?;
    let transport = connector.connect(&options)?;
    let collector = Arc::new(MetricsCollector::new());

    let spawned = run_load(
        &mode,
        LoadInputs {
            transport,
            plans: plans.into(),
            collector: Arc::clone(&collector),
        },
        settings,
        shutdown_tx,
    )
    .await?;
    collector.stop();

    let summary = collector.summary();
    info!(
        "Run finished: {} requests, {} failed",
        summary.total_requests, summary.failed_requests
    );
    Ok(assemble_result(
        &test_name,
        mode.shape(spawned),
        summary,
        auth_outcome,
    ))
}
