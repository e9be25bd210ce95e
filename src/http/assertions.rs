use std::num::FpCategory;

use serde_json::Value;

use crate::error::AssertionFailure;

use super::plan::{ExpectedJson, JsonExpectation};

/// # Errors
///
/// Returns `StatusMismatch` carrying both codes.
pub const fn check_status(expected: u16, actual: u16) -> Result<(), AssertionFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionFailure::StatusMismatch { expected, actual })
    }
}

/// Evaluates one JSON expectation against a decoded body. Only the first
/// JSONPath match is inspected.
///
/// # Errors
///
/// Returns the failed expectation.
pub fn check_json(body: &Value, expectation: &JsonExpectation) -> Result<(), AssertionFailure> {
    let value = expectation
        .path
        .query(body)
        .first()
        .ok_or_else(|| AssertionFailure::NoJsonMatch {
            path: expectation.path_text.clone(),
        })?;

    match &expectation.check {
        ExpectedJson::IsArray => {
            if value.is_array() {
                Ok(())
            } else {
                Err(AssertionFailure::NotArray {
                    kind: kind_name(value),
                })
            }
        }
        ExpectedJson::NotEmpty => {
            if is_truthy(value) {
                Ok(())
            } else {
                Err(AssertionFailure::Empty {
                    value: value.to_string(),
                })
            }
        }
        ExpectedJson::Equals(expected) => {
            if value.as_str() == Some(expected.as_str()) {
                Ok(())
            } else {
                Err(AssertionFailure::ValueMismatch {
                    expected: expected.clone(),
                    actual: value.to_string(),
                })
            }
        }
        ExpectedJson::HasSize(expected) => {
            let actual = sized_len(value).ok_or_else(|| AssertionFailure::NotSized {
                kind: kind_name(value),
            })?;
            if actual == *expected {
                Ok(())
            } else {
                Err(AssertionFailure::SizeMismatch {
                    expected: *expected,
                    actual,
                })
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number
            .as_f64()
            .is_some_and(|float| float.classify() != FpCategory::Zero),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn sized_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::String(text) => Some(text.chars().count()),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
