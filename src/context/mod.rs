//! Name resolution: environment bindings, variables, references, and `${name}`
//! template interpolation.
mod interpolate;
mod resolve;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigError;

pub use interpolate::interpolate;
pub use resolve::{
    merge_contexts, resolve_environment, resolve_environment_from, resolve_target, resolve_value,
    resolve_variables,
};

/// A flat name -> value table.
pub type Bindings = BTreeMap<String, String>;

/// Anything names can be looked up in.
pub trait ValueLookup {
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl ValueLookup for Bindings {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// The resolved run context. Built once per run, before any network activity,
/// and only extended afterwards through `insert_reserved`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    values: Bindings,
}

impl Context {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Binds a reserved runtime key (such as the auth token).
    ///
    /// # Errors
    ///
    /// Returns `ReservedNameConflict` when the name is already bound.
    pub fn insert_reserved(
        &mut self,
        name: &'static str,
        value: String,
    ) -> Result<(), ConfigError> {
        if self.values.contains_key(name) {
            return Err(ConfigError::ReservedNameConflict { name });
        }
        self.values.insert(name.to_owned(), value);
        Ok(())
    }
}

impl ValueLookup for Context {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl From<Bindings> for Context {
    fn from(values: Bindings) -> Self {
        Self { values }
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
