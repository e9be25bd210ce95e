use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {key}")]
    MissingEnvironmentVariable { key: String },
    #[error("Reference '#{name}' not found.")]
    UnresolvedReference { name: String },
    #[error("Duplicate names in environment and variables: {names}")]
    DuplicateBinding { names: String },
    #[error("Reserved name conflict: '{name}' already defined.")]
    ReservedNameConflict { name: &'static str },
    #[error("Missing target.")]
    MissingTarget,
    #[error("Invalid load profile: users must be > 0 (got {users}).")]
    InvalidLoadProfile { users: i64 },
    #[error("Unknown variable in template: ${{{name}}}")]
    UnknownTemplateVariable { name: String },
    #[error("Scenario '{scenario}' uses '{step}' before any request.")]
    ExpectBeforeRequest {
        scenario: String,
        step: &'static str,
    },
    #[error("Invalid JSONPath '{path}': {message}")]
    InvalidJsonPath { path: String, message: String },
    #[error("Failed to read test definition '{path}': {source}")]
    ReadDefinition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML test definition '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON test definition '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported test definition extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Test definition must have .toml or .json extension.")]
    MissingExtension,
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Load durations are whole seconds, got '{value}'.")]
    SubSecondLoadDuration { value: String },
    #[error("Invalid boolean '{value}'. Use true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
}
