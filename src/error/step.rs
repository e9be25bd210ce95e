use thiserror::Error;

use super::{ConfigError, HttpError};

/// A failed expectation on the current response. The display text is what
/// gets written into the failed request record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssertionFailure {
    #[error("Expected status {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },
    #[error("JSONPath did not match anything: {path}")]
    NoJsonMatch { path: String },
    #[error("Expected JSON path to be array, got: {kind}")]
    NotArray { kind: &'static str },
    #[error("Expected JSON path to be not empty, got: {value}")]
    Empty { value: String },
    #[error("JSON value mismatch, expected: {expected:?}, got: {actual}")]
    ValueMismatch { expected: String, actual: String },
    #[error("Expected JSON path to be sized (array/object/string), got: {kind}")]
    NotSized { kind: &'static str },
    #[error("JSON size mismatch, expected: {expected}, got: {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Response body is not valid JSON: {message}")]
    InvalidJsonBody { message: String },
}

/// Errors raised while interpreting one scenario iteration.
///
/// Only `NoResponseYet` and `Config` escape the interpreter; assertion and
/// transport failures are recorded against the iteration instead.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("'{step}' used before any request in scenario '{scenario}'")]
    NoResponseYet {
        scenario: String,
        step: &'static str,
    },
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error(transparent)]
    Transport(#[from] HttpError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
