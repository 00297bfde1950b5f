//! Resource records
//!
//! One flat record shape for every resource in a state export, discriminated
//! by its tag. Typed decoding happens in [`super::classify`].

use super::registry::ResourceKind;
use crate::error::{ArchError, ArchResult};
use serde_json::{Map, Value};

/// A single resource entry from a state export. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    /// Type tag as it appears in the input (`aws_vpc`, `subnet`, ...)
    pub kind: String,
    pub logical_name: String,
    pub attributes: Map<String, Value>,
}

impl ResourceRecord {
    pub fn new(kind: &str, logical_name: &str, attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            kind: kind.to_string(),
            logical_name: logical_name.to_string(),
            attributes,
        }
    }

    /// Read an attribute as a string. Numbers and booleans are rendered;
    /// null, arrays and objects count as absent.
    pub fn attr_str(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First present attribute among `keys`
    pub fn attr_str_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.attr_str(key))
    }

    /// Attribute as a non-empty string
    pub fn attr_non_empty(&self, key: &str) -> Option<String> {
        self.attr_str(key).filter(|s| !s.is_empty())
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(|v| v.as_bool())
    }

    /// Read a list of strings from the first present key. Non-string entries
    /// are skipped; an absent key yields an empty list.
    pub fn attr_string_list(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .find_map(|key| self.attributes.get(*key).and_then(|v| v.as_array()))
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Read a mandatory attribute, trying `aliases` after `field`.
    pub fn require(
        &self,
        kind: ResourceKind,
        field: &'static str,
        aliases: &[&str],
    ) -> ArchResult<String> {
        self.attr_str(field)
            .or_else(|| self.attr_str_any(aliases))
            .ok_or_else(|| ArchError::MissingField {
                kind: kind.as_str(),
                name: self.logical_name.clone(),
                field,
            })
    }
}
