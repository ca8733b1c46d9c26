//! `attributes`/`excludedAttributes` projection (RFC 7644 §3.9).
//!
//! Projection runs over the final JSON representation, after filtering and
//! sorting, so filters can still reference attributes the client chose not
//! to see. The attribute's `returned` characteristic always wins: `always`
//! attributes (`id`) survive exclusion, `never` attributes (`password`) are
//! never emitted, and `request` attributes appear only when named.

use crate::filter::{AttributePath, ParseError, parse_attribute_path};
use crate::schema::{AttributeDefinition, Returned, ResourceType};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
enum Mode {
    #[default]
    Default,
    Include(Vec<AttributePath>),
    Exclude(Vec<AttributePath>),
}

/// The attributes a client asked to see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSelection {
    mode: Mode,
}

/// Where an attribute lives: the core schema or an extension URN.
#[derive(Clone, Copy)]
struct Scope<'a> {
    urn: &'a str,
    is_core: bool,
}

impl AttributeSelection {
    /// No selection: every attribute returned by default.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse the comma-separated parameter values. `attributes` takes
    /// precedence when both are present.
    pub fn parse(attributes: Option<&str>, excluded: Option<&str>) -> Result<Self, ParseError> {
        let mode = match (parse_list(attributes)?, parse_list(excluded)?) {
            (Some(include), _) => Mode::Include(include),
            (None, Some(exclude)) => Mode::Exclude(exclude),
            (None, None) => Mode::Default,
        };
        Ok(Self { mode })
    }

    pub fn is_default(&self) -> bool {
        self.mode == Mode::Default
    }

    /// Project one representation.
    pub fn apply(&self, resource: &Value, resource_type: &ResourceType) -> Value {
        let Value::Object(object) = resource else {
            return resource.clone();
        };
        let core = Scope {
            urn: &resource_type.schema.id,
            is_core: true,
        };

        let mut projected = Map::new();
        for (key, value) in object {
            if key.eq_ignore_ascii_case("schemas") {
                projected.insert(key.clone(), value.clone());
                continue;
            }
            if let Some(extension) = resource_type.extension(key) {
                let scope = Scope {
                    urn: &extension.schema.id,
                    is_core: false,
                };
                if let Value::Object(bucket) = value {
                    let bucket = self.project_bucket(bucket, scope, |name| {
                        extension.schema.attribute(name)
                    });
                    if !bucket.is_empty() {
                        projected.insert(key.clone(), Value::Object(bucket));
                    }
                }
                continue;
            }
            let definition = resource_type
                .resolve(None, key)
                .map(|resolved| resolved.definition);
            if let Some(value) = self.project_attribute(key, value, core, definition) {
                projected.insert(key.clone(), value);
            }
        }
        Value::Object(projected)
    }

    fn project_bucket<'d>(
        &self,
        bucket: &Map<String, Value>,
        scope: Scope<'_>,
        lookup: impl Fn(&str) -> Option<&'d AttributeDefinition>,
    ) -> Map<String, Value> {
        bucket
            .iter()
            .filter_map(|(name, value)| {
                self.project_attribute(name, value, scope, lookup(name.as_str()))
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }

    fn project_attribute(
        &self,
        name: &str,
        value: &Value,
        scope: Scope<'_>,
        definition: Option<&AttributeDefinition>,
    ) -> Option<Value> {
        let returned = definition.map_or(Returned::Default, |def| def.returned);
        match returned {
            Returned::Never => return None,
            Returned::Always => return Some(without_never(value, definition)),
            Returned::Default | Returned::Request => {}
        }

        let selection = match &self.mode {
            Mode::Default => Selection::default(),
            Mode::Include(paths) | Mode::Exclude(paths) => Selection::collect(paths, name, scope),
        };

        let projected = match &self.mode {
            Mode::Default if returned == Returned::Request => return None,
            Mode::Default => without_never(value, definition),
            Mode::Include(_) if selection.whole => without_never(value, definition),
            Mode::Include(_) if !selection.subs.is_empty() => {
                retain_sub_attributes(value, definition, |sub| selection.names(sub))
            }
            Mode::Include(_) => return None,
            Mode::Exclude(_) if selection.whole || returned == Returned::Request => return None,
            Mode::Exclude(_) => retain_sub_attributes(value, definition, |sub| !selection.names(sub)),
        };
        (!is_empty(&projected)).then_some(projected)
    }
}

/// How the requested paths touch one attribute.
#[derive(Default)]
struct Selection<'p> {
    /// The attribute itself, or its whole extension, was named
    whole: bool,
    /// Sub-attributes named as `attr.sub`
    subs: Vec<&'p str>,
}

impl<'p> Selection<'p> {
    fn collect(paths: &'p [AttributePath], name: &str, scope: Scope<'_>) -> Self {
        let mut selection = Self::default();
        for path in paths {
            if !scope.is_core
                && path
                    .as_urn()
                    .is_some_and(|urn| urn.eq_ignore_ascii_case(scope.urn))
            {
                selection.whole = true;
                continue;
            }
            let in_scope = match &path.urn {
                Some(urn) => urn.eq_ignore_ascii_case(scope.urn),
                None => scope.is_core,
            };
            if !in_scope || !path.name.eq_ignore_ascii_case(name) {
                continue;
            }
            match &path.sub_attribute {
                Some(sub) => selection.subs.push(sub),
                None => selection.whole = true,
            }
        }
        selection
    }

    fn names(&self, sub: &str) -> bool {
        self.subs.iter().any(|name| name.eq_ignore_ascii_case(sub))
    }
}

fn parse_list(list: Option<&str>) -> Result<Option<Vec<AttributePath>>, ParseError> {
    let Some(list) = list else {
        return Ok(None);
    };
    let paths = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(parse_attribute_path)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((!paths.is_empty()).then_some(paths))
}

/// Drop `returned: never` sub-attributes.
fn without_never(value: &Value, definition: Option<&AttributeDefinition>) -> Value {
    retain_sub_attributes(value, definition, |_| true)
}

/// Keep the sub-attributes `keep` accepts, in an object or in each object of
/// an array. `returned` on the sub-attribute overrides `keep`.
fn retain_sub_attributes(
    value: &Value,
    definition: Option<&AttributeDefinition>,
    keep: impl Fn(&str) -> bool + Copy,
) -> Value {
    let project = |element: &Map<String, Value>| -> Value {
        let retained = element
            .iter()
            .filter(|(sub, _)| {
                match definition
                    .and_then(|def| def.sub_attribute(sub.as_str()))
                    .map(|def| def.returned)
                {
                    Some(Returned::Never) => false,
                    Some(Returned::Always) => true,
                    _ => keep(sub.as_str()),
                }
            })
            .map(|(sub, value)| (sub.clone(), value.clone()))
            .collect();
        Value::Object(retained)
    };

    match value {
        Value::Object(element) => project(element),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(element) => project(element),
                    other => other.clone(),
                })
                .filter(|item| !is_empty(item))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
