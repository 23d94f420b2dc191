#![forbid(unsafe_code)]

//! Document value model and shared lookup helpers
//!
//! A document is an already-decoded tree of scalars, sequences, and mappings,
//! represented as [`serde_yaml::Value`]. Mappings preserve insertion order and
//! may carry non-string keys, which the string-keyed-map check relies on.
//! Decoding raw text into this model is the caller's concern; documents
//! decoded from JSON interoperate through `serde_yaml::to_value`.
//!
//! The helpers in this module are shared between the cursor and the rule
//! implementations so that key lookup, emptiness, and numeric-ness mean the
//! same thing everywhere.

pub use serde_yaml::{Mapping, Number, Value};

/// Look up `key` in a mapping.
///
/// Mapping keys are full values; plain string keys are by far the common case
/// and this helper papers over the wrapping.
pub fn entry<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(&Value::String(key.to_owned()))
}

/// Whether `key` is present in the mapping.
pub fn contains_key(map: &Mapping, key: &str) -> bool {
    entry(map, key).is_some()
}

/// Emptiness of a single value.
///
/// Null, the empty string, and empty sequences/mappings are empty. Booleans
/// are never empty, `false` included. Numbers are never empty.
pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) => false,
        Value::Number(_) => false,
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => value_is_empty(&tagged.value),
    }
}

/// Numeric-ness of a single value.
///
/// Accepts numbers and numeric strings: `2.3` and `"2.3"` both pass.
pub fn value_is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.parse::<f64>().is_ok(),
        Value::Tagged(tagged) => value_is_numeric(&tagged.value),
        _ => false,
    }
}

/// Membership of `candidate` in `value` treated as a collection.
///
/// A sequence matches by element, a mapping by its values, and a scalar by
/// plain equality with the candidate.
pub fn collection_contains(value: &Value, candidate: &Value) -> bool {
    match value {
        Value::Sequence(seq) => seq.contains(candidate),
        Value::Mapping(map) => map.values().any(|v| v == candidate),
        Value::Tagged(tagged) => collection_contains(&tagged.value, candidate),
        scalar => scalar == candidate,
    }
}

/// Render a value for inclusion in an error message.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) => "<sequence>".to_string(),
        Value::Mapping(_) => "<mapping>".to_string(),
        Value::Tagged(tagged) => display_value(&tagged.value),
    }
}
