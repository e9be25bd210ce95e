mod app;
mod auth;
mod config;
mod http;
mod step;

pub use app::{AppError, AppResult};
pub use auth::AuthError;
pub use config::ConfigError;
pub use http::HttpError;
pub use step::{AssertionFailure, StepError};
