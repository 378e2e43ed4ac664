//! Domain DTOs for the CRM custom-object API.
//!
//! # Design
//! These types mirror the CRM v3 objects schema without validating it: a
//! `Record` keeps property values as raw JSON, and the list envelope treats
//! a missing `results` field as an empty page.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Properties requested for every record shown in the list view. The view
/// uses `name` as the record heading.
pub const PROPERTY_SET: &[&str] = &["name", "movie", "actor"];

/// Fixed page size of the list view.
pub const PAGE_LIMIT: u32 = 100;

/// Identifier of the custom object type every request operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectType(String);

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CRM API path of the object collection, e.g. `/crm/v3/objects/pets`.
    pub fn endpoint(&self) -> String {
        format!("/crm/v3/objects/{}", self.0)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single custom-object record returned by the CRM.
///
/// Property values are kept as raw JSON so an unexpected value type in one
/// record never fails the whole list. Fields other than `id` and
/// `properties` (`createdAt`, `archived`, ...) are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "string_or_scalar")]
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    /// String value of `name`, or `None` when it is absent, `null` or not a
    /// string.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// Text shown for `name`: strings as-is, other JSON values in their JSON
    /// form, absent and `null` as empty.
    pub fn display_property(&self, name: &str) -> String {
        match self.properties.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

fn string_or_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Envelope of a list response. Paging cursors are ignored; the list view
/// shows a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRecords {
    #[serde(default)]
    pub results: Vec<Record>,
}

/// Request payload for creating a record. Only the properties present in
/// the map are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecord {
    pub properties: BTreeMap<String, String>,
}

impl CreateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
