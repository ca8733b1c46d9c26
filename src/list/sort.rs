//! `sortBy`/`sortOrder` over resource representations (RFC 7644 §3.4.2.3).
//!
//! Multi-valued attributes sort by their primary value, or the first value
//! when none is primary. Resources without a value sort last ascending and
//! first descending. Ties always break by `id` ascending so pages are stable.

use crate::filter::AttributePath;
use crate::filter::evaluate::parse_date_time;
use crate::resource::get_ignore_case;
use crate::schema::{AttributeDefinition, AttributeScope, AttributeType, ResourceType};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ascending") {
            Ok(Self::Ascending)
        } else if s.eq_ignore_ascii_case("descending") {
            Ok(Self::Descending)
        } else {
            Err(format!(
                "sortOrder must be 'ascending' or 'descending', got '{}'",
                s
            ))
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ascending"),
            Self::Descending => f.write_str("descending"),
        }
    }
}

/// Sort representations in place by `sort_by`.
pub fn sort_resources(
    resources: &mut [Value],
    sort_by: &AttributePath,
    order: SortOrder,
    resource_type: &ResourceType,
) {
    let definition = sort_definition(sort_by, resource_type);
    resources.sort_by(|a, b| {
        let by_value = compare_keys(
            sort_key(a, sort_by, resource_type),
            sort_key(b, sort_by, resource_type),
            definition,
        );
        let by_value = match order {
            SortOrder::Ascending => by_value,
            SortOrder::Descending => by_value.reverse(),
        };
        by_value.then_with(|| id_of(a).cmp(&id_of(b)))
    });
}

fn id_of(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(Value::as_str)
}

fn sort_definition<'a>(
    path: &AttributePath,
    resource_type: &'a ResourceType,
) -> Option<&'a AttributeDefinition> {
    let definition = resource_type
        .resolve(path.urn.as_deref(), &path.name)?
        .definition;
    match &path.sub_attribute {
        Some(sub) => definition.sub_attribute(sub),
        None if definition.is_complex() => definition.sub_attribute("value"),
        None => Some(definition),
    }
}

/// The single value a resource sorts by, if it has one.
fn sort_key<'v>(
    resource: &'v Value,
    path: &AttributePath,
    resource_type: &ResourceType,
) -> Option<&'v Value> {
    let object = resource.as_object()?;
    let resolved = resource_type.resolve(path.urn.as_deref(), &path.name);
    let container = match resolved.map(|r| r.scope) {
        Some(AttributeScope::Extension(urn)) => get_ignore_case(object, urn)?.as_object()?,
        _ => object,
    };

    let mut value = get_ignore_case(container, &path.name)?;
    if let Value::Array(items) = value {
        value = items
            .iter()
            .find(|item| item.get("primary") == Some(&Value::Bool(true)))
            .or_else(|| items.first())?;
    }
    if let Some(sub) = &path.sub_attribute {
        value = get_ignore_case(value.as_object()?, sub)?;
    } else if let Value::Object(element) = value {
        value = get_ignore_case(element, "value")?;
    }
    (!value.is_null()).then_some(value)
}

/// Present values before absent ones, then by value.
fn compare_keys(
    a: Option<&Value>,
    b: Option<&Value>,
    definition: Option<&AttributeDefinition>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b, definition),
    }
}

fn compare_values(a: &Value, b: &Value, definition: Option<&AttributeDefinition>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            let is_date = definition.is_some_and(|def| def.data_type == AttributeType::DateTime);
            if is_date {
                if let (Some(a), Some(b)) = (parse_date_time(a), parse_date_time(b)) {
                    return a.cmp(&b);
                }
            }
            if definition.is_some_and(|def| def.case_exact) {
                a.cmp(b)
            } else {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
        }
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
