//! DlField - User-Defined Download-List Field

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity of a download-list field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DlFieldId {
    Number(i64),
    Text(String),
}

impl From<i64> for DlFieldId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for DlFieldId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

impl From<&str> for DlFieldId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for DlFieldId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl fmt::Display for DlFieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A download-list field
///
/// Only `id` is interpreted here; every other attribute is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlField {
    pub id: DlFieldId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DlField {
    /// Create a field with no attributes
    pub fn new(id: impl Into<DlFieldId>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_accepts_numbers_and_strings() {
        let a: DlField = serde_json::from_value(json!({ "id": 3, "name": "a" })).expect("field");
        let b: DlField = serde_json::from_value(json!({ "id": "x-1" })).expect("field");
        assert_eq!(a.id, DlFieldId::Number(3));
        assert_eq!(a.get("name"), Some(&json!("a")));
        assert_eq!(b.id, DlFieldId::Text("x-1".to_string()));
    }

    #[test]
    fn serializes_flat() {
        let field = DlField::new("f").with("name", "Title");
        let value = serde_json::to_value(&field).expect("value");
        assert_eq!(value, json!({ "id": "f", "name": "Title" }));
    }
}
