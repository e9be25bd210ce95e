use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};
use crate::model::TestDefinition;

/// Loads an already-validated test tree serialized as TOML or JSON.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or does not deserialize into a `TestDefinition`.
pub fn load_test_definition(path: &Path) -> AppResult<TestDefinition> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadDefinition {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}
