use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::parse_duration_value;
use crate::error::ConfigError;

/// Context key reserved for the bearer token produced by the auth preflight.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Seconds per minute/hour used when flattening `LoadDuration`.
const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips whitespace and the double quotes the source syntax leaves around
/// string literals.
#[must_use]
pub fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// Either a literal string or a reference to an already bound name.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrRef {
    Literal(String),
    Reference(String),
}

impl ValueOrRef {
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        ValueOrRef::Literal(value.into())
    }

    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        ValueOrRef::Reference(name.into())
    }
}

impl std::fmt::Display for ValueOrRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueOrRef::Literal(value) => f.write_str(unquote(value)),
            ValueOrRef::Reference(name) => write!(f, "#{}", name),
        }
    }
}

/// Binds a local name to a required process-environment key.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EnvironmentBinding {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VariableBinding {
    pub name: String,
    pub value: ValueOrRef,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BodyField {
    pub name: String,
    pub value: ValueOrRef,
}

/// One-shot login performed before any virtual user starts.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthBlock {
    pub endpoint: ValueOrRef,
    #[serde(default = "default_auth_method")]
    pub method: HttpMethod,
    #[serde(default)]
    pub body: Vec<BodyField>,
    /// JSONPath selecting the bearer token in the login response.
    pub token_path: String,
}

const fn default_auth_method() -> HttpMethod {
    HttpMethod::Post
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsonCheck {
    IsArray,
    NotEmpty,
    Equals { value: ValueOrRef },
    HasSize { size: usize },
}

impl JsonCheck {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            JsonCheck::IsArray => "isArray",
            JsonCheck::NotEmpty => "notEmpty",
            JsonCheck::Equals { .. } => "equals",
            JsonCheck::HasSize { .. } => "hasSize",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Request { method: HttpMethod, path: String },
    ExpectStatus { code: u16 },
    ExpectJson { path: String, check: JsonCheck },
}

impl Step {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Step::Request { .. } => "request",
            Step::ExpectStatus { .. } => "expect status",
            Step::ExpectJson { .. } => "expect json",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Whole-second duration expressed as hours/minutes/seconds.
///
/// Deserializes from either a table (`{ minutes = 1, seconds = 30 }`) or a
/// compact string (`"1m30s"`).
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "RawLoadDuration")]
pub struct LoadDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl LoadDuration {
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds,
        }
    }

    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(SECS_PER_HOUR)
            .saturating_add(self.minutes.saturating_mul(SECS_PER_MINUTE))
            .saturating_add(self.seconds)
    }

    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.total_seconds())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLoadDuration {
    Text(String),
    Seconds(u64),
    Parts {
        #[serde(default)]
        hours: u64,
        #[serde(default)]
        minutes: u64,
        #[serde(default)]
        seconds: u64,
    },
}

impl TryFrom<RawLoadDuration> for LoadDuration {
    type Error = ConfigError;

    fn try_from(raw: RawLoadDuration) -> Result<Self, Self::Error> {
        match raw {
            RawLoadDuration::Text(text) => {
                let duration = parse_duration_value(&text)?;
                if duration.subsec_nanos() != 0 {
                    return Err(ConfigError::SubSecondLoadDuration { value: text });
                }
                Ok(LoadDuration::from_secs(duration.as_secs()))
            }
            RawLoadDuration::Seconds(seconds) => Ok(LoadDuration::from_secs(seconds)),
            RawLoadDuration::Parts {
                hours,
                minutes,
                seconds,
            } => Ok(LoadDuration {
                hours,
                minutes,
                seconds,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoadProfile {
    pub users: i64,
    #[serde(default)]
    pub ramp_up: LoadDuration,
    #[serde(default)]
    pub duration: LoadDuration,
}

/// The validated test tree. Immutable for the lifetime of a run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TestDefinition {
    pub name: String,
    #[serde(default)]
    pub environment: Vec<EnvironmentBinding>,
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
    pub target: Option<ValueOrRef>,
    pub auth: Option<AuthBlock>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    pub load: Option<LoadProfile>,
}

impl TestDefinition {
    #[must_use]
    pub fn display_name(&self) -> &str {
        unquote(&self.name)
    }
}
