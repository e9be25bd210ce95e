use serde_json_path::JsonPath;

use crate::{
    context::{Context, interpolate, resolve_value},
    error::ConfigError,
    model::{HttpMethod, JsonCheck, Scenario, Step, unquote},
};

/// A scenario with every name already resolved against the run context.
///
/// Plans are compiled once, after the auth preflight and before the first
/// virtual user starts, so authoring mistakes surface as configuration errors
/// instead of per-iteration failures.
#[derive(Debug, Clone)]
pub struct ScenarioPlan {
    name: String,
    steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone)]
pub enum PlannedStep {
    Request { method: HttpMethod, path: String },
    ExpectStatus { code: u16 },
    ExpectJson(JsonExpectation),
}

#[derive(Debug, Clone)]
pub struct JsonExpectation {
    pub path_text: String,
    pub path: JsonPath,
    pub check: ExpectedJson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedJson {
    IsArray,
    NotEmpty,
    Equals(String),
    HasSize(usize),
}

impl ScenarioPlan {
    /// # Errors
    ///
    /// Returns `ExpectBeforeRequest` for an expectation with no preceding
    /// request, `UnknownTemplateVariable` / `UnresolvedReference` for unbound
    /// names, and `InvalidJsonPath` for malformed JSONPath expressions.
    pub fn compile(scenario: &Scenario, context: &Context) -> Result<Self, ConfigError> {
        let name = unquote(&scenario.name).to_owned();
        let mut seen_request = false;
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for step in &scenario.steps {
            let planned = match step {
                Step::Request { method, path } => {
                    seen_request = true;
                    PlannedStep::Request {
                        method: *method,
                        path: interpolate(path, context)?,
                    }
                }
                Step::ExpectStatus { .. } | Step::ExpectJson { .. } if !seen_request => {
                    return Err(ConfigError::ExpectBeforeRequest {
                        scenario: name,
                        step: step.label(),
                    });
                }
                Step::ExpectStatus { code } => PlannedStep::ExpectStatus { code: *code },
                Step::ExpectJson { path, check } => PlannedStep::ExpectJson(JsonExpectation {
                    path_text: unquote(path).to_owned(),
                    path: compile_json_path(path)?,
                    check: match check {
                        JsonCheck::IsArray => ExpectedJson::IsArray,
                        JsonCheck::NotEmpty => ExpectedJson::NotEmpty,
                        JsonCheck::Equals { value } => {
                            ExpectedJson::Equals(resolve_value(value, context)?)
                        }
                        JsonCheck::HasSize { size } => ExpectedJson::HasSize(*size),
                    },
                }),
            };
            steps.push(planned);
        }

        Ok(Self { name, steps })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }
}

/// Compiles every scenario in declaration order.
///
/// # Errors
///
/// Returns the first scenario's compile error.
pub fn compile_scenarios(
    scenarios: &[Scenario],
    context: &Context,
) -> Result<Vec<ScenarioPlan>, ConfigError> {
    scenarios
        .iter()
        .map(|scenario| ScenarioPlan::compile(scenario, context))
        .collect()
}

/// Parses a JSONPath expression. A bare member path such as `data.token` is
/// read as rooted at `$`.
///
/// # Errors
///
/// Returns `InvalidJsonPath` when the expression does not parse.
pub fn compile_json_path(raw: &str) -> Result<JsonPath, ConfigError> {
    let text = unquote(raw);
    let rooted = if text.starts_with('$') {
        text.to_owned()
    } else if text.starts_with('[') {
        format!("${}", text)
    } else {
        format!("$.{}", text)
    };
    JsonPath::parse(&rooted).map_err(|err| ConfigError::InvalidJsonPath {
        path: text.to_owned(),
        message: err.to_string(),
    })
}
