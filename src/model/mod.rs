//! The validated test tree handed over by the parser.
mod types;


pub use types::{
    AUTH_TOKEN_KEY, AuthBlock, BodyField, EnvironmentBinding, HttpMethod, JsonCheck, LoadDuration,
    LoadProfile, Scenario, Step, TestDefinition, ValueOrRef, VariableBinding, unquote,
};
