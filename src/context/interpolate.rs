use crate::error::ConfigError;
use crate::model::unquote;

use super::ValueLookup;

const PLACEHOLDER_OPEN: &str = "${";
const PLACEHOLDER_CLOSE: char = '}';

/// Replaces every `${identifier}` in the (unquoted) template with its bound
/// value. Substituted values are not scanned again.
///
/// # Errors
///
/// Returns `UnknownTemplateVariable` for the first unbound identifier; no
/// partially rendered output is returned in that case.
pub fn interpolate<L>(template: &str, context: &L) -> Result<String, ConfigError>
where
    L: ValueLookup + ?Sized,
{
    let mut rest = unquote(template);
    let mut output = String::with_capacity(rest.len());

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        let (before, after_start) = rest.split_at(start);
        output.push_str(before);
        let after_open = after_start
            .get(PLACEHOLDER_OPEN.len()..)
            .unwrap_or_default();
        let Some(end) = after_open.find(PLACEHOLDER_CLOSE) else {
            output.push_str(after_start);
            rest = "";
            break;
        };
        let (name, after_name) = after_open.split_at(end);
        if is_identifier(name) {
            let value = context
                .lookup(name)
                .ok_or_else(|| ConfigError::UnknownTemplateVariable {
                    name: name.to_owned(),
                })?;
            output.push_str(value);
            rest = after_name.strip_prefix(PLACEHOLDER_CLOSE).unwrap_or(after_name);
        } else {
            output.push_str(PLACEHOLDER_OPEN);
            rest = after_open;
        }
    }
    output.push_str(rest);

    Ok(output)
}

/// Names the interpolator will substitute: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
