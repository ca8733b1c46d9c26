//! Bidirectional mapping between SCIM resources and store records.

use super::record::StoreRecord;
use super::table::{Binding, MappingTable};
use crate::error::{ScimResult, ValidationErrors};
use crate::resource::{Meta, Resource, get_ignore_case, key_ignore_case};
use crate::schema::{AttributeDefinition, Mutability, ResourceKind, ResourceType, Returned};
use serde_json::{Map, Value};

/// The current state of a resource being updated.
#[derive(Debug, Clone, Copy)]
pub struct Prior<'a> {
    pub record: &'a StoreRecord,
    /// Full representation, including server-computed attributes
    pub representation: &'a Resource,
}

/// Maps one resource type between its SCIM representation and the store.
#[derive(Debug, Clone)]
pub struct ResourceMapper {
    resource_type: ResourceType,
    table: MappingTable,
    base_url: String,
}

impl ResourceMapper {
    pub fn new(resource_type: ResourceType, table: MappingTable, base_url: impl Into<String>) -> Self {
        Self {
            resource_type,
            table,
            base_url: base_url.into(),
        }
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource_type.kind
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// `meta.location` for a resource id.
    pub fn location(&self, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.kind().endpoint(),
            id
        )
    }

    /// Parse a request body into a canonicalized resource.
    pub fn prepare(&self, body: Value) -> ScimResult<Resource> {
        let mut resource = Resource::from_json(self.kind(), body)?;
        self.resource_type.normalize(&mut resource);
        Ok(resource)
    }

    /// Build the SCIM representation of a stored record.
    pub fn to_representation(&self, record: &StoreRecord) -> Resource {
        let mut attributes: Map<String, Value> = record
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for entry in self.table.entries() {
            let Some(value) = record.field(entry.store_field) else {
                continue;
            };
            if self
                .definition(entry.binding.attribute())
                .is_some_and(never_returned)
            {
                continue;
            }
            match entry.binding {
                Binding::Attribute(name) => {
                    attributes.insert(name.to_string(), value.clone());
                }
                Binding::SubAttribute(name, sub) => {
                    let parent = attributes
                        .entry(name.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(parent) = parent {
                        parent.insert(sub.to_string(), value.clone());
                    }
                }
                Binding::PrimaryValue(name) => set_primary_value(&mut attributes, name, value.clone()),
            }
        }

        let mut resource = Resource::new(self.kind());
        *resource.attributes_mut() = attributes;
        for ext in &self.resource_type.extensions {
            if let Some(bucket) = record.extensions.get(&ext.schema.id) {
                resource
                    .extensions_mut()
                    .insert(ext.schema.id.clone(), bucket.clone());
            }
        }
        let schemas = self
            .resource_type
            .schema_urns()
            .filter(|urn| self.resource_type.is_core_urn(urn) || resource.extension(urn).is_some())
            .map(str::to_string)
            .collect();
        resource.set_schemas(schemas);
        resource.set_id(record.id.clone());
        resource.set_external_id(record.external_id.clone());

        let mut meta =
            Meta::new(self.kind().as_str()).with_timestamps(record.created, record.last_modified);
        if let Some(id) = &record.id {
            meta = meta.with_location(self.location(id));
        }
        if let Some(version) = &record.version {
            meta = meta.with_version(version);
        }
        resource.set_meta(Some(meta));
        resource
    }

    /// Validate a resource and translate it into a store record.
    ///
    /// For updates `prior` supplies the values immutable and readOnly
    /// attributes are checked against, and the values of immutable and
    /// writeOnly attributes the request omitted. Every other omitted
    /// attribute is cleared.
    pub fn to_store_record(
        &self,
        resource: &Resource,
        prior: Option<Prior<'_>>,
    ) -> Result<StoreRecord, ValidationErrors> {
        let resource_type = &self.resource_type;
        resource_type.validate(resource, prior.map(|p| p.representation))?;

        let mut record = StoreRecord::new();
        if let Some(prior) = prior {
            record.id = prior.record.id.clone();
            record.created = prior.record.created;
            record.last_modified = prior.record.last_modified;
            record.version = prior.record.version.clone();
        }
        record.external_id = resource.external_id().map(str::to_string);

        let mut attributes = resource.attributes().clone();
        retain_from_prior(
            &resource_type.schema.attributes,
            &mut attributes,
            prior.map(|p| p.representation.attributes()),
        );
        strip_server_values(&resource_type.schema.attributes, &mut attributes);

        for entry in self.table.entries() {
            let extracted = match entry.binding {
                Binding::Attribute(name) => {
                    key_ignore_case(&attributes, name).and_then(|key| attributes.remove(&key))
                }
                Binding::SubAttribute(name, sub) => take_sub_attribute(&mut attributes, name, sub),
                Binding::PrimaryValue(name) => primary_value(&attributes, name),
            };
            match extracted {
                Some(value) if !value.is_null() => {
                    record.fields.insert(entry.store_field.to_string(), value);
                }
                _ => {
                    // writeOnly values are never echoed back, so keep them
                    let write_only = self
                        .definition(entry.binding.attribute())
                        .is_some_and(|def| def.mutability == Mutability::WriteOnly);
                    if let (true, Some(prior)) = (write_only, prior) {
                        if let Some(value) = prior.record.field(entry.store_field) {
                            record
                                .fields
                                .insert(entry.store_field.to_string(), value.clone());
                        }
                    }
                }
            }
        }
        record.attributes = attributes.into_iter().collect();

        for ext in &resource_type.extensions {
            let mut bucket = resource.extension(&ext.schema.id).cloned().unwrap_or_default();
            retain_from_prior(
                &ext.schema.attributes,
                &mut bucket,
                prior.and_then(|p| p.representation.extension(&ext.schema.id)),
            );
            strip_server_values(&ext.schema.attributes, &mut bucket);
            if !bucket.is_empty() {
                record.extensions.insert(ext.schema.id.clone(), bucket);
            }
        }

        Ok(record)
    }

    fn definition(&self, name: &str) -> Option<&AttributeDefinition> {
        self.resource_type.schema.attribute(name)
    }
}

fn never_returned(def: &AttributeDefinition) -> bool {
    def.returned == Returned::Never || def.mutability == Mutability::WriteOnly
}

/// Keep immutable and writeOnly values the request left out.
fn retain_from_prior(
    definitions: &[AttributeDefinition],
    attributes: &mut Map<String, Value>,
    prior: Option<&Map<String, Value>>,
) {
    let Some(prior) = prior else {
        return;
    };
    for def in definitions.iter().filter(|def| {
        matches!(def.mutability, Mutability::Immutable | Mutability::WriteOnly)
    }) {
        let omitted = get_ignore_case(attributes, &def.name).is_none_or(Value::is_null);
        if !omitted {
            continue;
        }
        if let Some(value) = get_ignore_case(prior, &def.name).filter(|v| !v.is_null()) {
            attributes.insert(def.name.clone(), value.clone());
        }
    }
}

/// Drop nulls, empty values and server-computed (readOnly) attributes.
fn strip_server_values(definitions: &[AttributeDefinition], attributes: &mut Map<String, Value>) {
    attributes.retain(|name, value| {
        let read_only = definitions
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
            .is_some_and(|def| def.mutability == Mutability::ReadOnly);
        !read_only && !is_empty(value)
    });
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.values().all(Value::is_null),
        _ => false,
    }
}

fn take_sub_attribute(attributes: &mut Map<String, Value>, name: &str, sub: &str) -> Option<Value> {
    let key = key_ignore_case(attributes, name)?;
    let Some(Value::Object(parent)) = attributes.get_mut(&key) else {
        return None;
    };
    let value = key_ignore_case(parent, sub).and_then(|sub_key| parent.remove(&sub_key));
    if parent.values().all(Value::is_null) {
        attributes.remove(&key);
    }
    value
}

/// Index of the element marked primary, or the first element.
fn primary_index(items: &[Value]) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let primary = items
        .iter()
        .position(|item| item.get("primary") == Some(&Value::Bool(true)));
    Some(primary.unwrap_or(0))
}

fn primary_value(attributes: &Map<String, Value>, name: &str) -> Option<Value> {
    let items = get_ignore_case(attributes, name)?.as_array()?;
    let index = primary_index(items)?;
    items[index].get("value").cloned()
}

fn set_primary_value(attributes: &mut Map<String, Value>, name: &str, value: Value) {
    if let Some(Value::Array(items)) = attributes.get_mut(name) {
        if let Some(index) = primary_index(items) {
            match &mut items[index] {
                Value::Object(element) => {
                    element.insert("value".to_string(), value);
                }
                other => *other = serde_json::json!({ "value": value }),
            }
            return;
        }
    }
    attributes.insert(
        name.to_string(),
        serde_json::json!([{ "value": value, "primary": true }]),
    );
}
