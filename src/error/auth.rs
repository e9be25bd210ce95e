use thiserror::Error;

use super::{ConfigError, HttpError};

/// Reasons the auth preflight can fail. These never abort the caller; they are
/// folded into a failed auth outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth.login could not be resolved: {0}")]
    Resolve(#[from] ConfigError),
    #[error("auth.login request failed: {0}")]
    Transport(#[from] HttpError),
    #[error("auth.login returned status {status}")]
    Status { status: u16 },
    #[error("auth.login response is not valid JSON: {message}")]
    InvalidBody { message: String },
    #[error("auth.login token not found using format {path}")]
    TokenNotFound { path: String },
    #[error("auth.login extracted token is not a non-empty string")]
    TokenNotString,
    #[error("auth.login token cannot be sent in an Authorization header")]
    TokenNotHeaderSafe,
}
