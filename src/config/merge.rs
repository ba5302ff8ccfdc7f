//! Policy layer merge
//!
//! Merges policy layers in precedence order with:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)
//!
//! and records, for every leaf, which layer set it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::PolicyError;

/// Layer a policy value came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyOrigin {
    Builtin,
    File,
    Cli,
}

/// Result of merging layers
#[derive(Debug, Clone)]
pub struct MergedLayers {
    pub value: Value,

    /// Dotted leaf path -> layer that last set it
    pub provenance: BTreeMap<String, PolicyOrigin>,
}

/// Deep merge two JSON values; `overlay` wins on conflicts.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<(PolicyOrigin, Value)>) -> MergedLayers {
    let mut provenance = BTreeMap::new();
    let mut value = Value::Null;

    for (origin, layer) in layers {
        record_leaves(&layer, "", origin, &mut provenance);
        value = deep_merge(value, layer);
    }

    MergedLayers { value, provenance }
}

fn record_leaves(
    value: &Value,
    prefix: &str,
    origin: PolicyOrigin,
    provenance: &mut BTreeMap<String, PolicyOrigin>,
) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                record_leaves(child, &join(prefix, key), origin, provenance);
            }
        }
        Value::Object(_) => {}
        _ => {
            // A leaf replaces whatever subtree or parent leaf was there before.
            let nested = format!("{}.", prefix);
            provenance.retain(|path, _| {
                !path.starts_with(&nested) && !prefix.starts_with(&format!("{}.", path))
            });
            provenance.insert(prefix.to_string(), origin);
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Build an override object from `dotted.path=value` assignments.
///
/// Values are parsed as JSON when possible (`42`, `true`, `["a"]`,
/// `"1.0"`) and taken as plain strings otherwise.
pub fn overrides_from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Value, PolicyError> {
    let mut root = Value::Object(Map::new());

    for assignment in assignments {
        let assignment = assignment.as_ref();
        let (path, raw) = assignment.split_once('=').ok_or_else(|| {
            PolicyError::ParseError(format!("override '{}' is not of the form key=value", assignment))
        })?;
        let path = path.trim();
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(PolicyError::ParseError(format!(
                "override '{}' has an invalid key path",
                assignment
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        set_path(&mut root, path, value)?;
    }

    Ok(root)
}

fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), PolicyError> {
    let mut current = root;
    let mut parts = path.split('.').peekable();

    while let Some(part) = parts.next() {
        let map = current.as_object_mut().ok_or_else(|| {
            PolicyError::ParseError(format!("override '{}' conflicts with a scalar override", path))
        })?;
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return Ok(());
        }
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Ok(())
}
