//! Filter evaluation against a resource's JSON representation.
//!
//! Attribute names match case-insensitively. String values compare
//! case-insensitively unless the attribute is `caseExact`. A comparison whose
//! operand types don't fit the attribute (a string against a boolean, a
//! malformed date) is simply false.

use super::ast::{AttributePath, CompValue, CompareOp, FilterNode};
use crate::resource::get_ignore_case;
use crate::schema::{AttributeDefinition, AttributeScope, AttributeType, ResourceType};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Where attribute paths are resolved.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Top level of a resource
    Resource(&'a ResourceType),
    /// Inside an element of a complex attribute (value path filters)
    Complex(Option<&'a AttributeDefinition>),
}

/// Evaluate `node` against a resource representation.
pub fn matches(node: &FilterNode, resource: &Value, resource_type: &ResourceType) -> bool {
    eval(node, Scope::Resource(resource_type), resource)
}

/// Evaluate `node` against one element of a multi-valued complex attribute.
pub fn matches_element(
    node: &FilterNode,
    element: &Value,
    parent: Option<&AttributeDefinition>,
) -> bool {
    eval(node, Scope::Complex(parent), element)
}

fn eval(node: &FilterNode, scope: Scope<'_>, target: &Value) -> bool {
    match node {
        FilterNode::And(left, right) => eval(left, scope, target) && eval(right, scope, target),
        FilterNode::Or(left, right) => eval(left, scope, target) || eval(right, scope, target),
        FilterNode::Not(inner) => !eval(inner, scope, target),
        FilterNode::Presence(path) => {
            let (_, values) = lookup(scope, target, path);
            values.iter().any(|value| is_present(value))
        }
        FilterNode::Comparison { path, op, value } => {
            let (definition, values) = lookup(scope, target, path);
            let candidates: Vec<&Value> = values
                .iter()
                .copied()
                .filter(|value| !value.is_null())
                .collect();

            match op {
                // `ne` holds when no value equals the literal, including
                // when the attribute is absent.
                CompareOp::Ne => {
                    if matches!(value, CompValue::Null) {
                        return !candidates.is_empty();
                    }
                    !candidates
                        .iter()
                        .any(|actual| compare(definition, actual, CompareOp::Eq, value))
                        && candidates
                            .iter()
                            .all(|actual| comparable(definition, actual, value))
                }
                CompareOp::Eq if matches!(value, CompValue::Null) => candidates.is_empty(),
                _ => candidates
                    .iter()
                    .any(|actual| compare(definition, actual, *op, value)),
            }
        }
        FilterNode::ValuePath { path, filter } => {
            let (definition, value) = resolve(scope, target, path);
            let elements: Vec<&Value> = match value {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(value) => vec![value],
                None => Vec::new(),
            };
            elements.into_iter().any(|element| {
                element.is_object() && eval(filter, Scope::Complex(definition), element)
            })
        }
    }
}

/// Resolve the attribute a path names (ignoring any sub-attribute) to its
/// definition, if known, and its raw value.
fn resolve<'a>(
    scope: Scope<'a>,
    target: &'a Value,
    path: &AttributePath,
) -> (Option<&'a AttributeDefinition>, Option<&'a Value>) {
    let Some(object) = target.as_object() else {
        return (None, None);
    };

    let (definition, container) = match scope {
        Scope::Resource(resource_type) => {
            match resource_type.resolve(path.urn.as_deref(), &path.name) {
                Some(resolved) => match resolved.scope {
                    AttributeScope::Core => (Some(resolved.definition), Some(object)),
                    AttributeScope::Extension(urn) => (
                        Some(resolved.definition),
                        get_ignore_case(object, urn).and_then(Value::as_object),
                    ),
                },
                None => (None, Some(object)),
            }
        }
        Scope::Complex(parent) => (
            parent.and_then(|parent| parent.sub_attribute(&path.name)),
            Some(object),
        ),
    };

    let value = container.and_then(|container| get_ignore_case(container, &path.name));
    (definition, value)
}

/// Resolve a path to its definition and every value it reaches. Multi-valued
/// attributes are flattened; a complex element without a sub-attribute
/// selector contributes its `value` sub-attribute.
fn lookup<'a>(
    scope: Scope<'a>,
    target: &'a Value,
    path: &AttributePath,
) -> (Option<&'a AttributeDefinition>, Vec<&'a Value>) {
    let (definition, value) = resolve(scope, target, path);
    let Some(value) = value else {
        return (definition, Vec::new());
    };

    match &path.sub_attribute {
        Some(sub) => (
            definition.and_then(|d| d.sub_attribute(sub)),
            sub_values(value, sub),
        ),
        None => match value {
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(element) => get_ignore_case(element, "value").unwrap_or(item),
                        _ => item,
                    })
                    .collect();
                let effective = definition
                    .filter(|d| d.is_complex())
                    .and_then(|d| d.sub_attribute("value"))
                    .or(definition);
                (effective, values)
            }
            other => (definition, vec![other]),
        },
    }
}

fn sub_values<'a>(value: &'a Value, sub: &str) -> Vec<&'a Value> {
    match value {
        Value::Object(object) => get_ignore_case(object, sub).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|element| get_ignore_case(element, sub))
            .collect(),
        _ => Vec::new(),
    }
}

/// Present means non-null and non-empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => items.iter().any(is_present),
        Value::Object(object) => !is_empty_object(object),
        _ => true,
    }
}

fn is_empty_object(object: &Map<String, Value>) -> bool {
    object.values().all(|value| !is_present(value))
}

/// Whether `actual` and `literal` have types that can be compared at all.
fn comparable(definition: Option<&AttributeDefinition>, actual: &Value, literal: &CompValue) -> bool {
    match (actual, literal) {
        (Value::String(a), CompValue::String(b)) => {
            !is_date_time(definition) || (parse_date_time(a).is_some() && parse_date_time(b).is_some())
        }
        (Value::Bool(_), CompValue::Bool(_)) => true,
        (Value::Number(_), CompValue::Number(_)) => true,
        _ => false,
    }
}

/// Compare one attribute value with a literal. Type mismatches are false.
pub fn compare(
    definition: Option<&AttributeDefinition>,
    actual: &Value,
    op: CompareOp,
    literal: &CompValue,
) -> bool {
    match (actual, literal) {
        (Value::String(a), CompValue::String(b)) if is_date_time(definition) => {
            match (parse_date_time(a), parse_date_time(b)) {
                (Some(a), Some(b)) => ordered(op, a.cmp(&b)),
                _ => false,
            }
        }
        (Value::String(a), CompValue::String(b)) => {
            let case_exact = definition.map(|d| d.case_exact).unwrap_or(false);
            let (a, b) = if case_exact {
                (a.clone(), b.clone())
            } else {
                (a.to_lowercase(), b.to_lowercase())
            };
            match op {
                CompareOp::Co => a.contains(&b),
                CompareOp::Sw => a.starts_with(&b),
                CompareOp::Ew => a.ends_with(&b),
                _ => ordered(op, a.cmp(&b)),
            }
        }
        (Value::Bool(a), CompValue::Bool(b)) => match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            _ => false,
        },
        (Value::Number(a), CompValue::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).is_some_and(|ord| ordered(op, ord)),
            _ => false,
        },
        _ => false,
    }
}

fn ordered(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Co | CompareOp::Sw | CompareOp::Ew => false,
    }
}

fn is_date_time(definition: Option<&AttributeDefinition>) -> bool {
    definition.is_some_and(|d| d.data_type == AttributeType::DateTime)
}

pub(crate) fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}
