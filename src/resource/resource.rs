//! The SCIM resource representation.
//!
//! A [`Resource`] is the open-ended JSON attribute tree of a User or Group,
//! split into the structural common attributes (`id`, `externalId`, `meta`,
//! `schemas`), the core attribute map, and one attribute bucket per extension
//! URN.

use super::meta::Meta;
use crate::error::{ScimError, ScimResult};
use crate::schema::ResourceKind;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A SCIM resource representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: ResourceKind,
    schemas: Vec<String>,
    id: Option<String>,
    external_id: Option<String>,
    attributes: Map<String, Value>,
    extensions: BTreeMap<String, Map<String, Value>>,
    meta: Option<Meta>,
}

impl Resource {
    /// An empty resource of the given type.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            schemas: Vec::new(),
            id: None,
            external_id: None,
            attributes: Map::new(),
            extensions: BTreeMap::new(),
            meta: None,
        }
    }

    /// Split a JSON body into a resource.
    ///
    /// Top-level keys that are URNs become extension buckets. A client supplied
    /// `meta` is kept only if it is well formed; it is server-maintained and
    /// never persisted from a request.
    pub fn from_json(kind: ResourceKind, data: Value) -> ScimResult<Self> {
        let Value::Object(object) = data else {
            return Err(ScimError::invalid_syntax(
                "Resource body must be a JSON object",
            ));
        };

        let mut resource = Self::new(kind);
        for (key, value) in object {
            match key.to_ascii_lowercase().as_str() {
                "schemas" => resource.schemas = parse_schemas(value)?,
                "id" => match value {
                    Value::String(id) => resource.id = Some(id),
                    Value::Null => {}
                    _ => return Err(ScimError::invalid_syntax("'id' must be a string")),
                },
                "externalid" => match value {
                    Value::String(external_id) => resource.external_id = Some(external_id),
                    Value::Null => {}
                    _ => {
                        return Err(ScimError::invalid_syntax("'externalId' must be a string"));
                    }
                },
                "meta" => resource.meta = serde_json::from_value(value).ok(),
                lower if lower.starts_with("urn:") => match value {
                    Value::Object(bucket) => {
                        resource.extensions.insert(key, bucket);
                    }
                    Value::Null => {}
                    _ => {
                        return Err(ScimError::invalid_syntax(format!(
                            "Extension '{}' must be a JSON object",
                            key
                        )));
                    }
                },
                _ => {
                    resource.attributes.insert(key, value);
                }
            }
        }
        Ok(resource)
    }

    /// Render the resource as SCIM JSON.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "schemas".to_string(),
            Value::Array(self.schemas.iter().cloned().map(Value::String).collect()),
        );
        if let Some(id) = &self.id {
            object.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(external_id) = &self.external_id {
            object.insert("externalId".to_string(), Value::String(external_id.clone()));
        }
        for (key, value) in &self.attributes {
            object.insert(key.clone(), value.clone());
        }
        for (urn, bucket) in &self.extensions {
            object.insert(urn.clone(), Value::Object(bucket.clone()));
        }
        if let Some(meta) = &self.meta {
            object.insert("meta".to_string(), meta.to_json());
        }
        Value::Object(object)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn set_external_id(&mut self, external_id: Option<String>) {
        self.external_id = external_id;
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn set_schemas(&mut self, schemas: Vec<String>) {
        self.schemas = schemas;
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn set_meta(&mut self, meta: Option<Meta>) {
        self.meta = meta;
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }

    pub fn extensions(&self) -> &BTreeMap<String, Map<String, Value>> {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut BTreeMap<String, Map<String, Value>> {
        &mut self.extensions
    }

    /// Core attribute by name, ignoring case.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        get_ignore_case(&self.attributes, name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Extension bucket by URN, ignoring case.
    pub fn extension(&self, urn: &str) -> Option<&Map<String, Value>> {
        self.extensions
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(urn))
            .map(|(_, bucket)| bucket)
    }
}

/// Case-insensitive key lookup in a JSON object.
pub fn get_ignore_case<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// The stored key matching `name` ignoring case, if any.
pub fn key_ignore_case(object: &Map<String, Value>, name: &str) -> Option<String> {
    object
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))
        .cloned()
}

fn parse_schemas(value: Value) -> ScimResult<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(uri) => Ok(uri),
                _ => Err(ScimError::invalid_syntax("'schemas' must contain strings")),
            })
            .collect(),
        _ => Err(ScimError::invalid_syntax("'schemas' must be an array")),
    }
}
