//! Merging input files into a single flat mapping

use crate::{Error, MappingInput, NestedMappingInput, Result};
use serde_json::Value;

/// Merge inputs left to right; later files overwrite earlier keys.
///
/// When `env` is given and an input has a top-level object under exactly that
/// key, the object replaces the input before merging. This supports files
/// shaped like `{"production": {...}, "staging": {...}}`.
///
/// Numbers and booleans are kept as they are.
///
/// # Errors
///
/// Returns [`Error::InvalidShape`] naming every key of the first offending
/// input whose value is an object, array or `null`.
pub fn merge_inputs(inputs: &[NestedMappingInput], env: Option<&str>) -> Result<MappingInput> {
    let mut merged = MappingInput::new();

    for input in inputs {
        let fields = match select_env(input, env) {
            Some(section) => flatten(section)?,
            None => flatten(input)?,
        };
        merged.extend(fields);
    }

    Ok(merged)
}

fn select_env<'a>(
    input: &'a NestedMappingInput,
    env: Option<&str>,
) -> Option<&'a serde_json::Map<String, Value>> {
    if let Some(env) = env
        && let Some(Value::Object(section)) = input.get(env)
    {
        tracing::debug!(env, "Selected environment section");
        return Some(section);
    }
    None
}

fn flatten<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a Value)>,
) -> Result<Vec<(String, Value)>> {
    let mut fields = Vec::new();
    let mut invalid = Vec::new();
    for (key, value) in entries {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                fields.push((key.clone(), value.clone()));
            }
            Value::Null | Value::Array(_) | Value::Object(_) => invalid.push(key.clone()),
        }
    }

    if !invalid.is_empty() {
        return Err(Error::InvalidShape { keys: invalid });
    }
    Ok(fields)
}
