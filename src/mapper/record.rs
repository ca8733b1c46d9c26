//! The host store's native record format.

use crate::resource::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Native field names of the host identity store.
pub mod fields {
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const ENABLED: &str = "enabled";
    pub const PASSWORD: &str = "password";
    pub const GROUP_NAME: &str = "name";
    pub const MEMBERS: &str = "members";
}

/// A user or group as the host store keeps it.
///
/// Well-known attributes live in `fields` under the store's own names. Every
/// other core attribute is kept in the generic `attributes` map keyed by
/// attribute name, and extension attributes are bucketed by schema URN.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    /// Store-assigned, never reused
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub fields: BTreeMap<String, Value>,
    pub attributes: BTreeMap<String, Value>,
    pub extensions: BTreeMap<String, Map<String, Value>>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub version: Option<Version>,
}

impl StoreRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Ids referenced by a group's `members` field.
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        self.field(fields::MEMBERS)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|member| member.get("value").and_then(Value::as_str))
    }

    /// The record without its store bookkeeping, as hashed for versions.
    pub fn content(&self) -> Value {
        serde_json::json!({
            "externalId": self.external_id,
            "fields": self.fields,
            "attributes": self.attributes,
            "extensions": self.extensions,
        })
    }
}
