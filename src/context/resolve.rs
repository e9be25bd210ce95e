use crate::error::ConfigError;
use crate::model::{EnvironmentBinding, ValueOrRef, VariableBinding, unquote};

use super::{Bindings, Context, ValueLookup};

/// Variables resolved so far layered over the environment table.
struct Layered<'bindings> {
    resolved: &'bindings Bindings,
    environment: &'bindings Bindings,
}

impl ValueLookup for Layered<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.resolved
            .lookup(name)
            .or_else(|| self.environment.lookup(name))
    }
}

/// Reads every binding's key from the process environment.
///
/// # Errors
///
/// Returns `MissingEnvironmentVariable` naming the first absent key.
pub fn resolve_environment(bindings: &[EnvironmentBinding]) -> Result<Bindings, ConfigError> {
    resolve_environment_from(bindings, |key| std::env::var(key).ok())
}

/// Same as `resolve_environment` with an explicit key lookup.
///
/// # Errors
///
/// Returns `MissingEnvironmentVariable` naming the first absent key.
pub fn resolve_environment_from<F>(
    bindings: &[EnvironmentBinding],
    lookup: F,
) -> Result<Bindings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = Bindings::new();
    for binding in bindings {
        let key = unquote(&binding.key);
        let value = lookup(key).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
            key: key.to_owned(),
        })?;
        resolved.insert(binding.name.clone(), value);
    }
    Ok(resolved)
}

/// Resolves variables in declaration order. Each value may reference any
/// environment binding or an earlier variable, never a later one.
///
/// # Errors
///
/// Returns `UnresolvedReference` when a reference cannot be satisfied.
pub fn resolve_variables(
    bindings: &[VariableBinding],
    environment: &Bindings,
) -> Result<Bindings, ConfigError> {
    let mut resolved = Bindings::new();
    for binding in bindings {
        let value = resolve_value(
            &binding.value,
            &Layered {
                resolved: &resolved,
                environment,
            },
        )?;
        resolved.insert(binding.name.clone(), value);
    }
    Ok(resolved)
}

/// Unions the environment and variable tables into the run context.
///
/// # Errors
///
/// Returns `DuplicateBinding` listing every name bound in both tables.
pub fn merge_contexts(environment: Bindings, variables: Bindings) -> Result<Context, ConfigError> {
    let overlap: Vec<&str> = variables
        .keys()
        .filter(|name| environment.contains_key(*name))
        .map(String::as_str)
        .collect();
    if !overlap.is_empty() {
        return Err(ConfigError::DuplicateBinding {
            names: overlap.join(", "),
        });
    }

    let mut merged = environment;
    merged.extend(variables);
    Ok(Context::from(merged))
}

/// Resolves a literal (unquoted, verbatim) or a reference by name.
///
/// # Errors
///
/// Returns `UnresolvedReference` when a referenced name is unbound.
pub fn resolve_value<L>(value: &ValueOrRef, lookup: &L) -> Result<String, ConfigError>
where
    L: ValueLookup + ?Sized,
{
    match value {
        ValueOrRef::Literal(literal) => Ok(unquote(literal).to_owned()),
        ValueOrRef::Reference(name) => lookup
            .lookup(name)
            .map(str::to_owned)
            .ok_or_else(|| ConfigError::UnresolvedReference { name: name.clone() }),
    }
}

/// Resolves the run's base URL. `Ok(None)` means no target was configured;
/// the caller decides whether that is fatal.
///
/// # Errors
///
/// Returns `UnresolvedReference` when the target references an unbound name.
pub fn resolve_target(
    target: Option<&ValueOrRef>,
    context: &Context,
) -> Result<Option<String>, ConfigError> {
    target
        .map(|value| resolve_value(value, context))
        .transpose()
}
