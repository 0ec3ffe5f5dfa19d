//! Symbol-style keys for YAML data.
//!
//! Progress logs written by the pre-assembly tooling use Ruby symbol keys,
//! which YAML carries as plain strings with a leading colon (`:pid`). These
//! helpers convert string-keyed data into that form so both spellings can be
//! read the same way.

use serde_yml::{Mapping, Value};

const SYMBOL_PREFIX: char = ':';

/// Symbol form of a name: `pid` becomes `:pid`, `:pid` stays as it is
pub fn to_symbol(name: &str) -> String {
    if name.starts_with(SYMBOL_PREFIX) {
        name.to_string()
    } else {
        format!("{SYMBOL_PREFIX}{name}")
    }
}

/// Recursively convert every string mapping key to symbol form.
///
/// Sequences are walked; values and non-string keys are left untouched.
pub fn symbolize_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(key, inner)| {
                    let key = match key {
                        Value::String(name) => Value::String(to_symbol(name)),
                        other => other.clone(),
                    };
                    (key, symbolize_keys(inner))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.iter().map(symbolize_keys).collect()),
        Value::Tagged(tagged) => symbolize_keys(&tagged.value),
        other => other.clone(),
    }
}

/// Convert the top-level string values of a mapping to symbol form, in place.
///
/// Keys and nested values are not touched.
pub fn values_to_symbols(mapping: &mut Mapping) {
    for (_, value) in mapping.iter_mut() {
        if let Value::String(text) = value {
            *text = to_symbol(text);
        }
    }
}

/// Look up `name` in a mapping by either its plain or symbol spelling
pub fn get<'a>(mapping: &'a Mapping, name: &str) -> Option<&'a Value> {
    mapping
        .get(to_symbol(name).as_str())
        .or_else(|| mapping.get(name.trim_start_matches(SYMBOL_PREFIX)))
}
