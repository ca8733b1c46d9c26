//! Applies PATCH operations to a resource representation (RFC 7644 §3.5.2).
//!
//! Operations run strictly in order against a private copy of the resource,
//! each seeing the effect of the ones before it. The caller gets the patched
//! copy only if every operation succeeded.

use super::errors::PatchError;
use super::operation::{PatchOp, PatchOperation};
use crate::filter::evaluate::matches_element;
use crate::filter::{CompareOp, FilterNode, PatchPath};
use crate::resource::{Meta, Resource, get_ignore_case};
use crate::schema::validation::{canonical_value, equivalent};
use crate::schema::{AttributeDefinition, AttributeScope, AttributeType, Mutability, ResourceType};
use log::trace;
use serde_json::{Map, Value};

/// An attribute a PATCH path resolved to.
#[derive(Clone, Copy)]
struct Target<'a> {
    scope: AttributeScope<'a>,
    definition: &'a AttributeDefinition,
    sub: Option<&'a AttributeDefinition>,
}

impl Target<'_> {
    fn is_common(&self, name: &str) -> bool {
        matches!(self.scope, AttributeScope::Core) && self.definition.name == name
    }

    fn is_read_only(&self) -> bool {
        self.definition.mutability == Mutability::ReadOnly
            || self
                .sub
                .is_some_and(|sub| sub.mutability == Mutability::ReadOnly)
    }
}

/// How a filtered update treats matching elements when no sub-attribute is named.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ElementUpdate {
    Merge,
    Replace,
}

/// PATCH engine for one resource type.
#[derive(Debug, Clone, Copy)]
pub struct PatchEngine<'a> {
    resource_type: &'a ResourceType,
}

impl<'a> PatchEngine<'a> {
    pub fn new(resource_type: &'a ResourceType) -> Self {
        Self { resource_type }
    }

    /// Apply `operations` in order and return the patched resource.
    ///
    /// The input is never modified; on error nothing of the partial result
    /// escapes.
    pub fn apply(
        &self,
        resource: &Resource,
        operations: &[PatchOperation],
    ) -> Result<Resource, PatchError> {
        let mut patched = resource.clone();
        self.resource_type.normalize(&mut patched);

        for (index, operation) in operations.iter().enumerate() {
            trace!(
                "PATCH op {}: {} {}",
                index,
                operation.op,
                operation.path.as_deref().unwrap_or("<none>")
            );
            self.apply_operation(&mut patched, operation)?;
        }

        patched.extensions_mut().retain(|_, bucket| !bucket.is_empty());
        self.resource_type.normalize(&mut patched);
        Ok(patched)
    }

    /// Apply a single operation in place.
    pub fn apply_operation(
        &self,
        resource: &mut Resource,
        operation: &PatchOperation,
    ) -> Result<(), PatchError> {
        match (operation.op, operation.path.as_deref()) {
            (PatchOp::Remove, None) => Err(PatchError::no_target("remove requires a path")),
            (op, None) => {
                let value = operation
                    .value
                    .as_ref()
                    .ok_or_else(|| PatchError::invalid_value("", format!("{} requires a value", op)))?;
                self.apply_without_path(resource, op, value)
            }
            (op, Some(raw)) => {
                let path = PatchPath::parse(raw).map_err(|e| PatchError::from_parse(raw, e))?;
                self.apply_at_path(resource, op, raw, &path, operation.value.as_ref())
            }
        }
    }

    /// `add`/`replace` without a path: each key of the value object is
    /// applied as if it were the path.
    fn apply_without_path(
        &self,
        resource: &mut Resource,
        op: PatchOp,
        value: &Value,
    ) -> Result<(), PatchError> {
        let Value::Object(object) = value else {
            return Err(PatchError::invalid_value(
                "",
                "value must be an object when no path is given",
            ));
        };

        for (key, value) in object {
            // server-maintained
            if key.eq_ignore_ascii_case("schemas") || key.eq_ignore_ascii_case("meta") {
                continue;
            }
            let path = PatchPath::parse(key).map_err(|e| PatchError::from_parse(key, e))?;
            self.apply_at_path(resource, op, key, &path, Some(value))?;
        }
        Ok(())
    }

    fn apply_at_path(
        &self,
        resource: &mut Resource,
        op: PatchOp,
        raw: &str,
        path: &PatchPath,
        value: Option<&Value>,
    ) -> Result<(), PatchError> {
        if path.filter.is_none() {
            let extension = path
                .attribute
                .as_urn()
                .and_then(|urn| self.resource_type.extension(&urn));
            if let Some(ext) = extension {
                return self.apply_to_extension(resource, op, &ext.schema.id, value);
            }
        }

        let target = self.resolve(raw, path)?;
        let needs_value = || {
            value.ok_or_else(|| PatchError::invalid_value(raw, format!("{} requires a value", op)))
        };

        if target.is_read_only() {
            // An unchanged echo of a readOnly value is harmless
            if op != PatchOp::Remove && path.filter.is_none() && target.sub.is_none() {
                let echoed = prepare(target.definition, needs_value()?.clone());
                if equivalent(&echoed, current_value(resource, &target).as_ref()) {
                    return Ok(());
                }
            }
            return Err(PatchError::not_modifiable(attribute_path(&target)));
        }

        if target.is_common("externalId") {
            return apply_to_external_id(resource, op, raw, value);
        }

        let definition = target.definition;
        let bucket = bucket_mut(resource, target.scope);
        let before = bucket.get(&definition.name).cloned();

        match op {
            PatchOp::Add => apply_add(bucket, &target, path, raw, needs_value()?)?,
            PatchOp::Replace => apply_replace(bucket, &target, path, needs_value()?)?,
            PatchOp::Remove => apply_remove(bucket, &target, path, value),
        }

        if bucket.get(&definition.name).is_some_and(is_empty_value) {
            bucket.remove(&definition.name);
        }
        if definition.mutability == Mutability::Immutable {
            let was_set = before.as_ref().is_some_and(|value| !value.is_null());
            let after = bucket.get(&definition.name).unwrap_or(&Value::Null);
            if was_set && !equivalent(after, before.as_ref()) {
                return Err(PatchError::not_modifiable(attribute_path(&target)));
            }
        }
        Ok(())
    }

    /// A path naming a whole extension, e.g. the enterprise User URN.
    fn apply_to_extension(
        &self,
        resource: &mut Resource,
        op: PatchOp,
        urn: &str,
        value: Option<&Value>,
    ) -> Result<(), PatchError> {
        if op == PatchOp::Remove {
            resource.extensions_mut().remove(urn);
            return Ok(());
        }
        let Some(Value::Object(attributes)) = value else {
            return Err(PatchError::invalid_value(
                urn,
                "extension value must be an object",
            ));
        };
        for (name, value) in attributes {
            let raw = format!("{}:{}", urn, name);
            let path = PatchPath::parse(&raw).map_err(|e| PatchError::from_parse(&raw, e))?;
            self.apply_at_path(resource, op, &raw, &path, Some(value))?;
        }
        Ok(())
    }

    fn resolve(&self, raw: &str, path: &PatchPath) -> Result<Target<'a>, PatchError> {
        let attribute = &path.attribute;
        let resolved = self
            .resource_type
            .resolve(attribute.urn.as_deref(), &attribute.name)
            .ok_or_else(|| PatchError::invalid_path(raw, "no such attribute"))?;
        let definition = resolved.definition;

        let sub = match path.target_sub_attribute() {
            Some(name) => Some(definition.sub_attribute(name).ok_or_else(|| {
                PatchError::invalid_path(
                    raw,
                    format!("'{}' has no sub-attribute '{}'", definition.name, name),
                )
            })?),
            None => None,
        };
        if path.filter.is_some() && !definition.multi_valued {
            return Err(PatchError::invalid_path(
                raw,
                "value filters apply to multi-valued attributes only",
            ));
        }

        Ok(Target {
            scope: resolved.scope,
            definition,
            sub,
        })
    }
}

fn apply_add(
    bucket: &mut Map<String, Value>,
    target: &Target<'_>,
    path: &PatchPath,
    raw: &str,
    value: &Value,
) -> Result<(), PatchError> {
    let def = target.definition;
    match (&path.filter, target.sub) {
        (None, None) if def.multi_valued => {
            let mut items = take_array(bucket, &def.name);
            let added = match prepare(def, value.clone()) {
                Value::Array(added) => added,
                single => vec![single],
            };
            for item in added {
                append_element(&mut items, item);
            }
            bucket.insert(def.name.clone(), Value::Array(items));
        }
        (None, None) => merge_into(bucket, def, prepare(def, value.clone())),
        (None, Some(sub)) => set_sub_attribute(bucket, def, sub, prepare(sub, value.clone()))?,
        (Some(filter), sub) => {
            let value = match sub {
                Some(sub) => prepare(sub, value.clone()),
                None => prepare(def, value.clone()),
            };
            let mut items = take_array(bucket, &def.name);
            let matched =
                update_matches(&mut items, def, filter, sub, &value, ElementUpdate::Merge)?;

            if matched == 0 && filter.is_equality_conjunction() {
                let mut element = Map::new();
                equality_fields(filter, def, &mut element);
                match (sub, value) {
                    (Some(sub), value) => {
                        element.insert(sub.name.clone(), value);
                    }
                    (None, Value::Object(fields)) => element.extend(fields),
                    (None, _) => {
                        return Err(PatchError::invalid_value(
                            raw,
                            "value must be an object for a value path",
                        ));
                    }
                }
                append_element(&mut items, Value::Object(element));
            }
            bucket.insert(def.name.clone(), Value::Array(items));
        }
    }
    Ok(())
}

fn apply_replace(
    bucket: &mut Map<String, Value>,
    target: &Target<'_>,
    path: &PatchPath,
    value: &Value,
) -> Result<(), PatchError> {
    let def = target.definition;
    match (&path.filter, target.sub) {
        (None, None) if def.multi_valued => {
            let items = match prepare(def, value.clone()) {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                single => vec![single],
            };
            bucket.insert(def.name.clone(), Value::Array(items));
        }
        // Sub-attributes absent from the value are left unchanged
        (None, None) => merge_into(bucket, def, prepare(def, value.clone())),
        (None, Some(sub)) => set_sub_attribute(bucket, def, sub, prepare(sub, value.clone()))?,
        (Some(filter), sub) => {
            let value = match sub {
                Some(sub) => prepare(sub, value.clone()),
                None => prepare(def, value.clone()),
            };
            let mut items = take_array(bucket, &def.name);
            // Zero matches leaves the resource as it was
            update_matches(&mut items, def, filter, sub, &value, ElementUpdate::Replace)?;
            bucket.insert(def.name.clone(), Value::Array(items));
        }
    }
    Ok(())
}

fn apply_remove(
    bucket: &mut Map<String, Value>,
    target: &Target<'_>,
    path: &PatchPath,
    value: Option<&Value>,
) {
    let def = target.definition;
    match (&path.filter, target.sub) {
        (None, None) => match value {
            // `remove members` with a value lists the elements to drop
            Some(listed) if def.multi_valued && !listed.is_null() => {
                let listed = match listed {
                    Value::Array(items) => items.clone(),
                    single => vec![single.clone()],
                };
                let mut items = take_array(bucket, &def.name);
                items.retain(|element| !listed.iter().any(|l| same_element(element, l)));
                bucket.insert(def.name.clone(), Value::Array(items));
            }
            _ => {
                bucket.remove(&def.name);
            }
        },
        (None, Some(sub)) => match bucket.get_mut(&def.name) {
            Some(Value::Object(object)) => {
                object.remove(&sub.name);
            }
            Some(Value::Array(items)) => {
                for element in items.iter_mut().filter_map(Value::as_object_mut) {
                    element.remove(&sub.name);
                }
            }
            _ => {}
        },
        (Some(filter), None) => {
            let mut items = take_array(bucket, &def.name);
            items.retain(|element| !matches_element(filter, element, Some(def)));
            bucket.insert(def.name.clone(), Value::Array(items));
        }
        (Some(filter), Some(sub)) => {
            if let Some(Value::Array(items)) = bucket.get_mut(&def.name) {
                for element in items.iter_mut() {
                    if matches_element(filter, element, Some(def)) {
                        if let Value::Object(element) = element {
                            element.remove(&sub.name);
                        }
                    }
                }
            }
        }
    }
}

/// Update the elements `filter` selects. Returns how many matched.
fn update_matches(
    items: &mut [Value],
    def: &AttributeDefinition,
    filter: &FilterNode,
    sub: Option<&AttributeDefinition>,
    value: &Value,
    mode: ElementUpdate,
) -> Result<usize, PatchError> {
    let matched: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, element)| matches_element(filter, element, Some(def)))
        .map(|(index, _)| index)
        .collect();

    for &index in &matched {
        let element = &mut items[index];
        match sub {
            Some(sub) => {
                if let Value::Object(object) = element {
                    check_immutable_sub(object, sub, value)?;
                    object.insert(sub.name.clone(), value.clone());
                }
            }
            None => {
                let merge = mode == ElementUpdate::Merge && element.is_object() && value.is_object();
                if !merge {
                    *element = value.clone();
                } else if let (Some(object), Value::Object(fields)) = (element.as_object_mut(), value) {
                    object.extend(fields.clone());
                }
            }
        }
    }

    let sets_primary = match sub {
        Some(sub) => sub.name == "primary" && value == &Value::Bool(true),
        None => is_primary(value),
    };
    if sets_primary && !matched.is_empty() {
        for (index, element) in items.iter_mut().enumerate() {
            if !matched.contains(&index) {
                demote(element);
            }
        }
    }
    Ok(matched.len())
}

fn set_sub_attribute(
    bucket: &mut Map<String, Value>,
    def: &AttributeDefinition,
    sub: &AttributeDefinition,
    value: Value,
) -> Result<(), PatchError> {
    if def.multi_valued {
        if let Some(Value::Array(items)) = bucket.get_mut(&def.name) {
            for element in items.iter_mut().filter_map(Value::as_object_mut) {
                check_immutable_sub(element, sub, &value)?;
                element.insert(sub.name.clone(), value.clone());
            }
        }
        return Ok(());
    }

    let parent = bucket
        .entry(def.name.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !parent.is_object() {
        *parent = Value::Object(Map::new());
    }
    if let Value::Object(parent) = parent {
        check_immutable_sub(parent, sub, &value)?;
        parent.insert(sub.name.clone(), value);
    }
    Ok(())
}

fn check_immutable_sub(
    element: &Map<String, Value>,
    sub: &AttributeDefinition,
    value: &Value,
) -> Result<(), PatchError> {
    if sub.mutability == Mutability::Immutable {
        if let Some(existing) = element.get(&sub.name).filter(|v| !v.is_null()) {
            if existing != value {
                return Err(PatchError::not_modifiable(sub.path.clone()));
            }
        }
    }
    Ok(())
}

fn apply_to_external_id(
    resource: &mut Resource,
    op: PatchOp,
    raw: &str,
    value: Option<&Value>,
) -> Result<(), PatchError> {
    match (op, value) {
        (PatchOp::Remove, _) | (_, Some(Value::Null)) => resource.set_external_id(None),
        (_, Some(Value::String(external_id))) => resource.set_external_id(Some(external_id.clone())),
        (_, Some(_)) => return Err(PatchError::invalid_value(raw, "externalId must be a string")),
        (_, None) => return Err(PatchError::invalid_value(raw, format!("{} requires a value", op))),
    }
    Ok(())
}

/// Add an element to a multi-valued attribute. Exact duplicates are
/// skipped, and a new primary demotes the old one.
fn append_element(items: &mut Vec<Value>, item: Value) {
    if items.contains(&item) {
        return;
    }
    if is_primary(&item) {
        items.iter_mut().for_each(demote);
    }
    items.push(item);
}

fn merge_into(bucket: &mut Map<String, Value>, def: &AttributeDefinition, value: Value) {
    if def.is_complex() {
        if let (Some(Value::Object(existing)), Value::Object(fields)) =
            (bucket.get_mut(&def.name), &value)
        {
            existing.extend(fields.clone());
            return;
        }
    }
    bucket.insert(def.name.clone(), value);
}

/// Build the element an `eq`-only value filter describes.
fn equality_fields(node: &FilterNode, def: &AttributeDefinition, element: &mut Map<String, Value>) {
    match node {
        FilterNode::Comparison {
            path,
            op: CompareOp::Eq,
            value,
        } => {
            let name = def
                .sub_attribute(&path.name)
                .map_or_else(|| path.name.clone(), |sub| sub.name.clone());
            element.insert(name, value.to_json());
        }
        FilterNode::And(left, right) => {
            equality_fields(left, def, element);
            equality_fields(right, def, element);
        }
        _ => {}
    }
}

fn take_array(bucket: &mut Map<String, Value>, name: &str) -> Vec<Value> {
    match bucket.remove(name) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(single) => vec![single],
    }
}

fn bucket_mut<'r>(resource: &'r mut Resource, scope: AttributeScope<'_>) -> &'r mut Map<String, Value> {
    match scope {
        AttributeScope::Core => resource.attributes_mut(),
        AttributeScope::Extension(urn) => resource.extensions_mut().entry(urn.to_string()).or_default(),
    }
}

fn current_value(resource: &Resource, target: &Target<'_>) -> Option<Value> {
    if target.is_common("id") {
        return resource.id().map(|id| Value::String(id.to_string()));
    }
    if target.is_common("meta") {
        return resource.meta().map(Meta::to_json);
    }
    let bucket = match target.scope {
        AttributeScope::Core => Some(resource.attributes()),
        AttributeScope::Extension(urn) => resource.extension(urn),
    };
    bucket
        .and_then(|bucket| get_ignore_case(bucket, &target.definition.name))
        .cloned()
}

fn attribute_path(target: &Target<'_>) -> String {
    match target.sub {
        Some(sub) => sub.path.clone(),
        None => target.definition.path.clone(),
    }
}

/// Canonical names, and the string booleans some clients send.
fn prepare(def: &AttributeDefinition, value: Value) -> Value {
    canonical_value(def, coerce(def, value))
}

fn coerce(def: &AttributeDefinition, value: Value) -> Value {
    match value {
        Value::String(s) if def.data_type == AttributeType::Boolean => {
            match s.to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(s),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|item| coerce(def, item)).collect()),
        Value::Object(object) if def.is_complex() => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| match def.sub_attribute(&key) {
                    Some(sub) => (key, coerce(sub, value)),
                    None => (key, value),
                })
                .collect(),
        ),
        other => other,
    }
}

fn is_primary(value: &Value) -> bool {
    value.get("primary") == Some(&Value::Bool(true))
}

fn demote(element: &mut Value) {
    if let Some(object) = element.as_object_mut() {
        if object.get("primary") == Some(&Value::Bool(true)) {
            object.insert("primary".to_string(), Value::Bool(false));
        }
    }
}

fn same_element(element: &Value, listed: &Value) -> bool {
    match (element.get("value"), listed.get("value")) {
        (Some(a), Some(b)) => a == b,
        _ => element == listed,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}
