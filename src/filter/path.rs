//! PATCH operation paths (RFC 7644 §3.5.2).
//!
//! `PATH = attrPath / valuePath [subAttr]`, e.g. `members`,
//! `name.familyName`, `emails[type eq "work"]` or
//! `addresses[type eq "work"].postalCode`.

use super::ast::{AttributePath, FilterNode};
use super::parser::{FilterParser, ParseError, ParseResult};
use std::fmt;

/// A parsed PATCH target.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchPath {
    pub attribute: AttributePath,
    /// Element selector for multi-valued attributes
    pub filter: Option<FilterNode>,
    /// Sub-attribute selected after a value filter
    pub filter_sub_attribute: Option<String>,
}

impl PatchPath {
    pub fn parse(input: &str) -> ParseResult<Self> {
        let mut parser = FilterParser::new(input);
        parser.skip_whitespace();
        let attribute = parser.parse_attribute_path()?;

        let mut filter = None;
        let mut filter_sub_attribute = None;
        if parser.peek() == Some('[') {
            if attribute.sub_attribute.is_some() {
                return Err(parser.error("end of path"));
            }
            filter = Some(parser.parse_value_filter()?);

            if parser.try_consume_char('.') {
                let start = parser.position();
                let sub = parser.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '$'));
                if sub.is_empty() {
                    return Err(ParseError::new(start, "sub-attribute name"));
                }
                filter_sub_attribute = Some(sub.to_string());
            }
        }
        parser.expect_end()?;

        Ok(Self {
            attribute,
            filter,
            filter_sub_attribute,
        })
    }

    /// The sub-attribute the path finally targets, whichever form it uses.
    pub fn target_sub_attribute(&self) -> Option<&str> {
        self.filter_sub_attribute
            .as_deref()
            .or(self.attribute.sub_attribute.as_deref())
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attribute)?;
        if let Some(filter) = &self.filter {
            write!(f, "[{}]", filter)?;
        }
        if let Some(sub) = &self.filter_sub_attribute {
            write!(f, ".{}", sub)?;
        }
        Ok(())
    }
}
