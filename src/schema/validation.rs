//! Schema-driven validation of resource representations.
//!
//! Validation never stops at the first problem: every violation found is
//! collected into [`ValidationErrors`] so a single error response can list
//! them all.

use super::types::{AttributeDefinition, AttributeType, Mutability, ResourceType};
use crate::error::{ValidationError, ValidationErrors};
use crate::resource::{Resource, get_ignore_case};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::DateTime;
use serde_json::{Map, Value};

impl ResourceType {
    /// Rewrite attribute names, extension URNs and schema URIs to their
    /// canonical spelling, and drop server-computed (readOnly) sub-attributes
    /// of client-writable complex attributes.
    pub fn normalize(&self, resource: &mut Resource) {
        let attributes = std::mem::take(resource.attributes_mut());
        *resource.attributes_mut() =
            canonical_object(attributes, |name| self.schema.attribute(name));

        let extensions = std::mem::take(resource.extensions_mut());
        for (urn, bucket) in extensions {
            match self.extension(&urn) {
                Some(ext) => {
                    let bucket = canonical_object(bucket, |name| ext.schema.attribute(name));
                    resource
                        .extensions_mut()
                        .insert(ext.schema.id.clone(), bucket);
                }
                None => {
                    resource.extensions_mut().insert(urn, bucket);
                }
            }
        }

        let mut schemas: Vec<String> = Vec::new();
        let listed = resource.schemas().iter().map(|uri| {
            if self.is_core_urn(uri) {
                self.schema.id.clone()
            } else {
                self.extension(uri)
                    .map(|ext| ext.schema.id.clone())
                    .unwrap_or_else(|| uri.clone())
            }
        });
        let with_data = resource.extensions().keys().cloned();
        for uri in listed.chain(with_data).collect::<Vec<_>>() {
            if !schemas.iter().any(|s| s.eq_ignore_ascii_case(&uri)) {
                schemas.push(uri);
            }
        }
        resource.set_schemas(schemas);
    }

    /// Validate a resource against this resource type.
    ///
    /// `prior` is the current representation for updates; it supplies the
    /// values readOnly and immutable attributes are compared against.
    pub fn validate(
        &self,
        resource: &Resource,
        prior: Option<&Resource>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !resource.schemas().iter().any(|uri| self.is_core_urn(uri)) {
            errors.push(ValidationError::MissingCoreSchema {
                core_schema: self.schema.id.clone(),
            });
        }
        let mut unknown_uris: Vec<&str> = Vec::new();
        let extension_keys = resource.extensions().keys().map(String::as_str);
        for uri in resource.schemas().iter().map(String::as_str).chain(extension_keys) {
            if !self.is_core_urn(uri)
                && self.extension(uri).is_none()
                && !unknown_uris.iter().any(|u| u.eq_ignore_ascii_case(uri))
            {
                unknown_uris.push(uri);
                errors.push(ValidationError::UnknownSchemaUri {
                    uri: uri.to_string(),
                });
            }
        }
        for ext in self.extensions.iter().filter(|ext| ext.required) {
            if resource.extension(&ext.schema.id).is_none() {
                errors.push(ValidationError::MissingRequiredExtension {
                    uri: ext.schema.id.clone(),
                });
            }
        }

        check_bucket(
            &self.schema.id,
            &self.schema.attributes,
            resource.attributes(),
            prior.map(Resource::attributes),
            &mut errors,
        );
        for ext in &self.extensions {
            if let Some(bucket) = resource.extension(&ext.schema.id) {
                check_bucket(
                    &ext.schema.id,
                    &ext.schema.attributes,
                    bucket,
                    prior.and_then(|p| p.extension(&ext.schema.id)),
                    &mut errors,
                );
            }
        }

        errors.into_result()
    }
}

fn canonical_object<'a>(
    object: Map<String, Value>,
    lookup: impl Fn(&str) -> Option<&'a AttributeDefinition>,
) -> Map<String, Value> {
    object
        .into_iter()
        .map(|(key, value)| match lookup(&key) {
            Some(def) => (def.name.clone(), canonical_value(def, value)),
            None => (key, value),
        })
        .collect()
}

pub(crate) fn canonical_value(def: &AttributeDefinition, value: Value) -> Value {
    if !def.is_complex() {
        return value;
    }
    match value {
        Value::Object(object) => Value::Object(canonical_complex(def, object)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(object) => Value::Object(canonical_complex(def, object)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn canonical_complex(def: &AttributeDefinition, object: Map<String, Value>) -> Map<String, Value> {
    let writable_parent = def.mutability != Mutability::ReadOnly;
    object
        .into_iter()
        .filter_map(|(key, value)| match def.sub_attribute(&key) {
            Some(sub) if writable_parent && sub.mutability == Mutability::ReadOnly => None,
            Some(sub) => Some((sub.name.clone(), value)),
            None => Some((key, value)),
        })
        .collect()
}

/// Validate one attribute bucket (core attributes or one extension).
fn check_bucket(
    schema_id: &str,
    definitions: &[AttributeDefinition],
    bucket: &Map<String, Value>,
    prior: Option<&Map<String, Value>>,
    errors: &mut ValidationErrors,
) {
    for (name, value) in bucket {
        let Some(def) = definitions
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
        else {
            errors.push(ValidationError::UnknownAttribute {
                attribute: name.clone(),
                schema_id: schema_id.to_string(),
            });
            continue;
        };
        check_value(schema_id, def, value, errors);

        let previous = prior.and_then(|p| get_ignore_case(p, &def.name));
        check_mutability(def, value, previous, errors);
    }

    for def in definitions
        .iter()
        .filter(|def| def.required && def.mutability != Mutability::ReadOnly)
    {
        let present = get_ignore_case(bucket, &def.name).is_some_and(|value| !value.is_null());
        // immutable and writeOnly values omitted on replace are kept from prior
        let retained = matches!(def.mutability, Mutability::Immutable | Mutability::WriteOnly)
            && prior
                .and_then(|p| get_ignore_case(p, &def.name))
                .is_some_and(|value| !value.is_null());
        if !present && !retained {
            errors.push(ValidationError::MissingRequiredAttribute {
                attribute: def.path.clone(),
            });
        }
    }
}

fn check_mutability(
    def: &AttributeDefinition,
    value: &Value,
    previous: Option<&Value>,
    errors: &mut ValidationErrors,
) {
    match def.mutability {
        Mutability::ReadOnly if !value.is_null() && !equivalent(value, previous) => {
            errors.push(ValidationError::ReadOnlyViolation {
                attribute: def.path.clone(),
            });
        }
        Mutability::Immutable => {
            let already_set = previous.is_some_and(|p| !p.is_null());
            if already_set && !equivalent(value, previous) {
                errors.push(ValidationError::ImmutableViolation {
                    attribute: def.path.clone(),
                });
            }
        }
        _ => {}
    }
}

/// Value equality where multi-valued attributes ignore element order and an
/// absent value equals null.
pub(crate) fn equivalent(value: &Value, previous: Option<&Value>) -> bool {
    match (value, previous) {
        (Value::Null, None) => true,
        (_, None) => false,
        (Value::Array(a), Some(Value::Array(b))) => {
            a.len() == b.len() && a.iter().all(|item| b.contains(item))
        }
        (a, Some(b)) => a == b,
    }
}

fn check_value(
    schema_id: &str,
    def: &AttributeDefinition,
    value: &Value,
    errors: &mut ValidationErrors,
) {
    if value.is_null() {
        return;
    }
    if def.multi_valued {
        let Value::Array(items) = value else {
            errors.push(ValidationError::ExpectedMultiValue {
                attribute: def.path.clone(),
            });
            return;
        };
        for item in items {
            check_single(schema_id, def, item, errors);
        }
        if def.is_complex() {
            let primaries = items
                .iter()
                .filter(|item| {
                    item.as_object()
                        .and_then(|object| get_ignore_case(object, "primary"))
                        == Some(&Value::Bool(true))
                })
                .count();
            if primaries > 1 {
                errors.push(ValidationError::MultiplePrimaryValues {
                    attribute: def.path.clone(),
                });
            }
        }
    } else if value.is_array() {
        errors.push(ValidationError::ExpectedSingleValue {
            attribute: def.path.clone(),
        });
    } else {
        check_single(schema_id, def, value, errors);
    }
}

fn check_single(
    schema_id: &str,
    def: &AttributeDefinition,
    value: &Value,
    errors: &mut ValidationErrors,
) {
    if value.is_null() {
        return;
    }
    let type_ok = match def.data_type {
        AttributeType::String | AttributeType::Reference => value.is_string(),
        AttributeType::Binary => value.as_str().is_some_and(|s| BASE64.decode(s).is_ok()),
        AttributeType::Boolean => value.is_boolean(),
        AttributeType::Integer => value.is_i64() || value.is_u64(),
        AttributeType::Decimal => value.is_number(),
        AttributeType::DateTime => match value.as_str() {
            Some(s) => {
                if DateTime::parse_from_rfc3339(s).is_err() {
                    errors.push(ValidationError::InvalidDateTimeFormat {
                        attribute: def.path.clone(),
                        value: s.to_string(),
                    });
                }
                true
            }
            None => false,
        },
        AttributeType::Complex => match value.as_object() {
            Some(object) => {
                check_complex(schema_id, def, object, errors);
                true
            }
            None => false,
        },
    };

    if !type_ok {
        errors.push(ValidationError::InvalidAttributeType {
            attribute: def.path.clone(),
            expected: def.data_type.to_string(),
            actual: json_type(value).to_string(),
        });
    }
}

fn check_complex(
    schema_id: &str,
    def: &AttributeDefinition,
    object: &Map<String, Value>,
    errors: &mut ValidationErrors,
) {
    for (key, value) in object {
        match def.sub_attribute(key) {
            Some(sub) => check_value(schema_id, sub, value, errors),
            None => errors.push(ValidationError::UnknownAttribute {
                attribute: format!("{}.{}", def.path, key),
                schema_id: schema_id.to_string(),
            }),
        }
    }
    for sub in def.sub_attributes.iter().filter(|sub| sub.required) {
        let present = get_ignore_case(object, &sub.name).is_some_and(|value| !value.is_null());
        if !present {
            errors.push(ValidationError::MissingSubAttribute {
                attribute: def.path.clone(),
                sub_attribute: sub.name.clone(),
            });
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
