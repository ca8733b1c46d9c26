//! SCIM filter expressions.
//!
//! [`FilterExpression::parse`] turns a filter string into an immutable tree
//! of [`FilterNode`]s; [`FilterExpression::evaluate`] tests a resource
//! representation against it without mutating anything.
//!
//! ```rust
//! use scim_provider::filter::FilterExpression;
//! use scim_provider::schema::{ResourceKind, SchemaRegistry};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type(ResourceKind::User);
//! let filter = FilterExpression::parse(r#"userName eq "bjensen""#)?;
//!
//! assert!(filter.evaluate(&json!({ "userName": "bjensen" }), users));
//! assert!(!filter.evaluate(&json!({ "userName": "jsmith" }), users));
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod evaluate;
pub mod parser;
pub mod path;

pub use ast::{AttributePath, CompValue, CompareOp, FilterNode};
pub use parser::{ParseError, parse_attribute_path, parse_filter};
pub use path::PatchPath;

use crate::schema::ResourceType;
use serde_json::Value;
use std::fmt;

/// A parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    root: FilterNode,
}

impl FilterExpression {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_filter(input).map(|root| Self { root })
    }

    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    pub fn evaluate(&self, resource: &Value, resource_type: &ResourceType) -> bool {
        evaluate::matches(&self.root, resource, resource_type)
    }

    /// Paths the filter names that the resource type does not define.
    pub fn unknown_paths(&self, resource_type: &ResourceType) -> Vec<String> {
        let mut unknown = Vec::new();
        self.root.visit_paths(&mut |path, parent| {
            let known = match parent {
                None => known_path(resource_type, path),
                Some(parent) => resource_type
                    .resolve(parent.urn.as_deref(), &parent.name)
                    .and_then(|resolved| resolved.definition.sub_attribute(&path.name))
                    .is_some(),
            };
            if !known {
                unknown.push(match parent {
                    Some(parent) => format!("{}.{}", parent, path),
                    None => path.to_string(),
                });
            }
        });
        unknown
    }
}

fn known_path(resource_type: &ResourceType, path: &AttributePath) -> bool {
    let Some(resolved) = resource_type.resolve(path.urn.as_deref(), &path.name) else {
        return false;
    };
    match &path.sub_attribute {
        Some(sub) => resolved.definition.sub_attribute(sub).is_some(),
        None => true,
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
