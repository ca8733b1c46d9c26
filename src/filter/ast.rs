//! Filter expression tree.

use serde_json::{Number, Value};
use std::fmt;

/// An attribute reference: `[urn:]name[.subAttribute]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// Schema URN prefix, when the path is fully qualified
    pub urn: Option<String>,
    pub name: String,
    pub sub_attribute: Option<String>,
}

impl AttributePath {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            urn: None,
            name: name.into(),
            sub_attribute: None,
        }
    }

    pub fn with_sub_attribute(mut self, sub_attribute: impl Into<String>) -> Self {
        self.sub_attribute = Some(sub_attribute.into());
        self
    }

    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    /// The URN a bare path would name if it referred to a whole extension,
    /// e.g. `urn:...:enterprise:2.0:User`.
    pub fn as_urn(&self) -> Option<String> {
        match (&self.urn, &self.sub_attribute) {
            (Some(urn), None) => Some(format!("{}:{}", urn, self.name)),
            _ => None,
        }
    }

    /// The same path without its sub-attribute.
    pub fn parent(&self) -> AttributePath {
        Self {
            urn: self.urn.clone(),
            name: self.name.clone(),
            sub_attribute: None,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(urn) = &self.urn {
            write!(f, "{}:", urn)?;
        }
        f.write_str(&self.name)?;
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{}", sub)?;
        }
        Ok(())
    }
}

/// Comparison operators (RFC 7644 §3.4.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "co" => Some(Self::Co),
            "sw" => Some(Self::Sw),
            "ew" => Some(Self::Ew),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Co => "co",
            Self::Sw => "sw",
            Self::Ew => "ew",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CompValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl CompValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CompValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", Value::String(s.clone())),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// A node of a parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Comparison {
        path: AttributePath,
        op: CompareOp,
        value: CompValue,
    },
    Presence(AttributePath),
    And(Box<FilterNode>, Box<FilterNode>),
    Or(Box<FilterNode>, Box<FilterNode>),
    Not(Box<FilterNode>),
    /// `attr[subFilter]`, evaluated against each element of `attr`
    ValuePath {
        path: AttributePath,
        filter: Box<FilterNode>,
    },
}

impl FilterNode {
    /// Every attribute path the filter references, outermost first. Paths
    /// inside a value filter are relative to the value path's attribute.
    pub fn visit_paths<'a>(&'a self, visit: &mut dyn FnMut(&'a AttributePath, Option<&'a AttributePath>)) {
        self.visit_inner(None, visit);
    }

    fn visit_inner<'a>(
        &'a self,
        parent: Option<&'a AttributePath>,
        visit: &mut dyn FnMut(&'a AttributePath, Option<&'a AttributePath>),
    ) {
        match self {
            Self::Comparison { path, .. } | Self::Presence(path) => visit(path, parent),
            Self::And(left, right) | Self::Or(left, right) => {
                left.visit_inner(parent, visit);
                right.visit_inner(parent, visit);
            }
            Self::Not(inner) => inner.visit_inner(parent, visit),
            Self::ValuePath { path, filter } => {
                visit(path, parent);
                filter.visit_inner(Some(path), visit);
            }
        }
    }

    /// True when the filter is a conjunction of `eq` comparisons only, the
    /// shape PATCH `add` can turn into a new element.
    pub fn is_equality_conjunction(&self) -> bool {
        match self {
            Self::Comparison {
                op: CompareOp::Eq, ..
            } => true,
            Self::And(left, right) => {
                left.is_equality_conjunction() && right.is_equality_conjunction()
            }
            _ => false,
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { path, op, value } => write!(f, "{} {} {}", path, op, value),
            Self::Presence(path) => write!(f, "{} pr", path),
            Self::And(left, right) => write!(f, "({} and {})", left, right),
            Self::Or(left, right) => write!(f, "({} or {})", left, right),
            Self::Not(inner) => write!(f, "not ({})", inner),
            Self::ValuePath { path, filter } => write!(f, "{}[{}]", path, filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_path_display() {
        let path = AttributePath::new("name").with_sub_attribute("givenName");
        assert_eq!(path.to_string(), "name.givenName");

        let qualified = AttributePath::new("department")
            .with_urn("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User");
        assert_eq!(
            qualified.to_string(),
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department"
        );
    }

    #[test]
    fn test_as_urn_only_for_unqualified_leaf() {
        let path = AttributePath::new("User").with_urn("urn:ietf:params:scim:schemas:extension:enterprise:2.0");
        assert_eq!(
            path.as_urn().as_deref(),
            Some("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
        );
        assert!(AttributePath::new("userName").as_urn().is_none());
    }

    #[test]
    fn test_equality_conjunction() {
        let eq = FilterNode::Comparison {
            path: AttributePath::new("type"),
            op: CompareOp::Eq,
            value: CompValue::String("work".to_string()),
        };
        let both = FilterNode::And(Box::new(eq.clone()), Box::new(eq.clone()));
        assert!(both.is_equality_conjunction());
        assert!(!FilterNode::Not(Box::new(eq)).is_equality_conjunction());
    }
}
