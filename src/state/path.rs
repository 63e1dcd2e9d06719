//! Dotted-Path Access
//!
//! Resolves `parent.child` keys against the JSON document view of the state.
//! Only one level of nesting is addressed: the key is split at the first
//! separator and the remainder is taken literally as the child key.

use serde_json::{Map, Value};
use snafu::OptionExt;

use crate::constants::KEY_SEPARATOR;
use crate::error::{MissingParentSnafu, NotContainerSnafu, Result};

/// Split a key into `(parent, child)` at the first separator
pub fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once(KEY_SEPARATOR) {
        Some((parent, child)) => (parent, Some(child)),
        None => (key, None),
    }
}

/// Look up a key, treating `null` the same as a missing entry
pub fn get<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let value = match split_key(key) {
        (parent, Some(child)) => root.get(parent)?.as_object()?.get(child)?,
        (top, None) => root.get(top)?,
    };
    (!value.is_null()).then_some(value)
}

/// Look up a key, returning `default` on any miss
pub fn get_or(root: &Map<String, Value>, key: &str, default: Value) -> Value {
    get(root, key).cloned().unwrap_or(default)
}

/// Write a value at a key
///
/// A two-level key requires its parent to already exist as an object;
/// intermediate containers are never created.
pub fn set(root: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    match split_key(key) {
        (parent, Some(child)) => {
            let container = root
                .get_mut(parent)
                .context(MissingParentSnafu { key, parent })?;
            let Value::Object(map) = container else {
                return NotContainerSnafu { key, parent }.fail();
            };
            map.insert(child.to_string(), value);
        }
        (top, None) => {
            root.insert(top.to_string(), value);
        }
    }
    Ok(())
}
