//! Resource metadata (`meta`, RFC 7643 §3.1).

use super::version::Version;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-maintained metadata for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Weak ETag form, `W/"<token>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Meta {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            created: None,
            last_modified: None,
            location: None,
            version: None,
        }
    }

    pub fn with_timestamps(
        mut self,
        created: Option<DateTime<Utc>>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        self.created = created;
        self.last_modified = last_modified;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_version(mut self, version: &Version) -> Self {
        self.version = Some(version.to_etag());
        self
    }

    /// Parsed `version`, if present and well formed.
    pub fn parsed_version(&self) -> Option<Version> {
        self.version
            .as_deref()
            .and_then(|etag| Version::parse_etag(etag).ok())
    }

    /// JSON form with timestamps rendered at millisecond precision.
    pub fn to_json(&self) -> Value {
        let mut meta = Map::new();
        meta.insert(
            "resourceType".to_string(),
            Value::String(self.resource_type.clone()),
        );
        if let Some(created) = self.created {
            meta.insert("created".to_string(), Value::String(render_time(created)));
        }
        if let Some(last_modified) = self.last_modified {
            meta.insert(
                "lastModified".to_string(),
                Value::String(render_time(last_modified)),
            );
        }
        if let Some(location) = &self.location {
            meta.insert("location".to_string(), Value::String(location.clone()));
        }
        if let Some(version) = &self.version {
            meta.insert("version".to_string(), Value::String(version.clone()));
        }
        Value::Object(meta)
    }
}

fn render_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
