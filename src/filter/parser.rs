//! Recursive descent parser for SCIM filters (RFC 7644 §3.4.2.2).
//!
//! Precedence, loosest first: `or`, `and`, `not`, comparison. Parentheses
//! override precedence. Keywords and operators are case-insensitive.

use super::ast::{AttributePath, CompValue, CompareOp, FilterNode};
use serde_json::Number;

/// Malformed filter or attribute path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected} at position {position}")]
pub struct ParseError {
    /// Byte offset into the input where parsing failed
    pub position: usize,
    /// What the parser was looking for there
    pub expected: String,
}

impl ParseError {
    pub fn new(position: usize, expected: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a complete filter expression.
pub fn parse_filter(input: &str) -> ParseResult<FilterNode> {
    let mut parser = FilterParser::new(input);
    let node = parser.parse_or()?;
    parser.expect_end()?;
    Ok(node)
}

/// Parse a bare attribute path such as `name.givenName`.
pub fn parse_attribute_path(input: &str) -> ParseResult<AttributePath> {
    let mut parser = FilterParser::new(input);
    parser.skip_whitespace();
    let path = parser.parse_attribute_path()?;
    parser.expect_end()?;
    Ok(path)
}

pub(crate) struct FilterParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> FilterParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn expect_end(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error("end of input"));
        }
        Ok(())
    }

    pub(crate) fn parse_or(&mut self) -> ParseResult<FilterNode> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.try_consume_keyword("or") {
                let right = self.parse_and()?;
                left = FilterNode::Or(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_and(&mut self) -> ParseResult<FilterNode> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if self.try_consume_keyword("and") {
                let right = self.parse_unary()?;
                left = FilterNode::And(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_unary(&mut self) -> ParseResult<FilterNode> {
        self.skip_whitespace();
        // `not(...)` and `not expr` are both accepted; the operand binds
        // tighter than `and`.
        if self.try_consume_keyword("not") {
            let inner = self.parse_unary()?;
            return Ok(FilterNode::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<FilterNode> {
        self.skip_whitespace();
        if self.try_consume_char('(') {
            let inner = self.parse_or()?;
            self.skip_whitespace();
            if !self.try_consume_char(')') {
                return Err(self.error("')'"));
            }
            return Ok(inner);
        }
        self.parse_attr_expr()
    }

    fn parse_attr_expr(&mut self) -> ParseResult<FilterNode> {
        let path = self.parse_attribute_path()?;

        if self.peek() == Some('[') {
            if path.sub_attribute.is_some() {
                return Err(self.error("comparison operator"));
            }
            let filter = self.parse_value_filter()?;
            return Ok(FilterNode::ValuePath {
                path,
                filter: Box::new(filter),
            });
        }

        self.skip_whitespace();
        let op_start = self.pos;
        let keyword = self.take_while(|c| c.is_ascii_alphabetic());
        if keyword.eq_ignore_ascii_case("pr") {
            return Ok(FilterNode::Presence(path));
        }
        let op = CompareOp::from_keyword(keyword)
            .ok_or_else(|| ParseError::new(op_start, "comparison operator"))?;

        self.skip_whitespace();
        let value = self.parse_comp_value()?;
        Ok(FilterNode::Comparison { path, op, value })
    }

    /// `[ valFilter ]`, the opening bracket not yet consumed.
    pub(crate) fn parse_value_filter(&mut self) -> ParseResult<FilterNode> {
        if !self.try_consume_char('[') {
            return Err(self.error("'['"));
        }
        let filter = self.parse_or()?;
        if contains_value_path(&filter) {
            return Err(self.error("']' (value filters cannot nest)"));
        }
        self.skip_whitespace();
        if !self.try_consume_char(']') {
            return Err(self.error("']'"));
        }
        Ok(filter)
    }

    /// `[urn:]name[.sub]`. A URN prefix is split at its last ':'.
    pub(crate) fn parse_attribute_path(&mut self) -> ParseResult<AttributePath> {
        let start = self.pos;
        let token = self.take_while(|c| {
            c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-' | '$')
        });
        if token.is_empty() {
            return Err(ParseError::new(start, "attribute path"));
        }

        let (urn, rest, rest_start) = if token.len() > 4 && token[..4].eq_ignore_ascii_case("urn:")
        {
            let split = token.rfind(':').unwrap_or(0);
            (Some(&token[..split]), &token[split + 1..], start + split + 1)
        } else {
            (None, token, start)
        };

        let (name, sub) = match rest.split_once('.') {
            Some((name, sub)) => (name, Some(sub)),
            None => (rest, None),
        };
        if !is_attr_name(name) {
            return Err(ParseError::new(rest_start, "attribute name"));
        }
        if let Some(sub) = sub {
            if !is_attr_name(sub) {
                return Err(ParseError::new(
                    rest_start + name.len() + 1,
                    "sub-attribute name",
                ));
            }
        }

        Ok(AttributePath {
            urn: urn.map(str::to_string),
            name: name.to_string(),
            sub_attribute: sub.map(str::to_string),
        })
    }

    /// `"string"`, `true`, `false`, `null` or a JSON number.
    fn parse_comp_value(&mut self) -> ParseResult<CompValue> {
        let start = self.pos;
        match self.peek() {
            Some('"') => {
                let end = self.find_string_end()?;
                let literal = &self.input[start..end];
                let value: String = serde_json::from_str(literal)
                    .map_err(|_| ParseError::new(start, "valid string literal"))?;
                self.pos = end;
                Ok(CompValue::String(value))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let literal = self.take_while(|c| {
                    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
                });
                let number: Number = serde_json::from_str(literal)
                    .map_err(|_| ParseError::new(start, "numeric literal"))?;
                Ok(CompValue::Number(number))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.take_while(|c| c.is_ascii_alphanumeric());
                match word.to_ascii_lowercase().as_str() {
                    "true" => Ok(CompValue::Bool(true)),
                    "false" => Ok(CompValue::Bool(false)),
                    "null" => Ok(CompValue::Null),
                    _ => Err(ParseError::new(start, "comparison value")),
                }
            }
            _ => Err(ParseError::new(start, "comparison value")),
        }
    }

    /// Byte offset just past the closing quote of the string at `pos`.
    fn find_string_end(&self) -> ParseResult<usize> {
        let mut escaped = false;
        for (offset, c) in self.input[self.pos..].char_indices().skip(1) {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => return Ok(self.pos + offset + 1),
                _ => {}
            }
        }
        Err(ParseError::new(self.input.len(), "closing '\"'"))
    }

    pub(crate) fn skip_whitespace(&mut self) {
        let skipped = self.input[self.pos..]
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum::<usize>();
        self.pos += skipped;
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    pub(crate) fn try_consume_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` if it appears here as a whole word.
    fn try_consume_keyword(&mut self, keyword: &str) -> bool {
        let remaining = &self.input[self.pos..];
        let Some(candidate) = remaining.get(..keyword.len()) else {
            return false;
        };
        if !candidate.eq_ignore_ascii_case(keyword) {
            return false;
        }
        match remaining[keyword.len()..].chars().next() {
            Some(c) if c.is_whitespace() || c == '(' => {
                self.pos += keyword.len();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        let len = input[start..]
            .chars()
            .take_while(|c| predicate(*c))
            .map(char::len_utf8)
            .sum::<usize>();
        self.pos += len;
        &input[start..self.pos]
    }

    pub(crate) fn error(&self, expected: &str) -> ParseError {
        ParseError::new(self.pos, expected)
    }
}

/// ATTRNAME = ALPHA *(nameChar), plus `$ref`.
fn is_attr_name(name: &str) -> bool {
    if name == "$ref" {
        return true;
    }
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn contains_value_path(node: &FilterNode) -> bool {
    match node {
        FilterNode::ValuePath { .. } => true,
        FilterNode::And(left, right) | FilterNode::Or(left, right) => {
            contains_value_path(left) || contains_value_path(right)
        }
        FilterNode::Not(inner) => contains_value_path(inner),
        FilterNode::Comparison { .. } | FilterNode::Presence(_) => false,
    }
}
