use crate::error::ConfigError;

/// Accepts the usual truthy/falsy spellings (`1`, `yes`, `off`, ...).
pub(crate) fn parse_bool_env(s: &str) -> Result<bool, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            value: s.to_owned(),
        }),
    }
}

/// `NO_COLOR` convention: any non-empty value disables color.
#[expect(
    clippy::unnecessary_wraps,
    reason = "clap value parsers return a Result"
)]
pub(crate) fn parse_no_color_env(s: &str) -> Result<bool, ConfigError> {
    Ok(!s.trim().is_empty())
}
