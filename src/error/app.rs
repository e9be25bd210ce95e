use thiserror::Error;

use super::{ConfigError, HttpError, StepError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Scenario error: {0}")]
    Step(#[from] StepError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn http<E>(error: E) -> Self
    where
        E: Into<HttpError>,
    {
        error.into().into()
    }

    pub fn step<E>(error: E) -> Self
    where
        E: Into<StepError>,
    {
        error.into().into()
    }

    /// Returns the configuration error when this is one.
    #[must_use]
    pub const fn as_config(&self) -> Option<&ConfigError> {
        match self {
            AppError::Config(error) => Some(error),
            AppError::Io { .. }
            | AppError::Json { .. }
            | AppError::Join { .. }
            | AppError::Http(_)
            | AppError::Step(_) => None,
        }
    }
}
