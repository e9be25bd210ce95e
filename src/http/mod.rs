//! HTTP transport seam, auth preflight, and the scenario interpreter.
mod assertions;
mod auth;
mod plan;
mod scenario;
mod transport;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

pub use assertions::{check_json, check_status};
pub use auth::{PreflightReport, run_auth_preflight};
pub use plan::{
    ExpectedJson, JsonExpectation, PlannedStep, ScenarioPlan, compile_json_path,
    compile_scenarios,
};
pub use scenario::{IterationOutcome, run_scenario_iteration};
pub use transport::{
    ClientOptions, Connector, DEFAULT_USER_AGENT, HttpRequest, HttpResponse, ReqwestConnector,
    ReqwestTransport, Transport,
};
