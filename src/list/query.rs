//! Query parameters for listing resources.
//!
//! A [`ListQuery`] comes either from a GET query string or from the body of
//! a `POST .search` request. Both carry the same parameters.

use crate::error::{ScimError, ScimResult};
use crate::list::{PageRequest, SortOrder};
use crate::resource::get_ignore_case;
use serde_json::Value;

/// Schema URN of a `POST .search` body.
pub const SEARCH_REQUEST_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";

/// Query parameters for listing resources.
///
/// Values are kept as the client sent them; the controller parses `filter`
/// and `sortBy` so errors are reported against the resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Filter expression
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// Starting index for pagination, 1-based
    pub start_index: Option<i64>,
    /// Maximum number of results to return
    pub count: Option<i64>,
    /// Comma-separated attributes to include in results
    pub attributes: Option<String>,
    /// Comma-separated attributes to exclude from results
    pub excluded_attributes: Option<String>,
}

impl ListQuery {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the sort attribute and direction.
    pub fn with_sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(order);
        self
    }

    /// Set the starting index.
    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = Some(start_index);
        self
    }

    /// Set the maximum count.
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    pub fn with_excluded_attributes(mut self, excluded: impl Into<String>) -> Self {
        self.excluded_attributes = Some(excluded.into());
        self
    }

    /// Parse a URL query string (without the leading `?`). Parameter names
    /// ignore case; unknown parameters are ignored.
    pub fn from_query(query: &str) -> ScimResult<Self> {
        let mut list_query = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.to_ascii_lowercase().as_str() {
                "filter" => list_query.filter = Some(value),
                "sortby" => list_query.sort_by = Some(value),
                "sortorder" => list_query.sort_order = Some(parse_sort_order(&value)?),
                "startindex" => list_query.start_index = Some(parse_integer("startIndex", &value)?),
                "count" => list_query.count = Some(parse_integer("count", &value)?),
                "attributes" => list_query.attributes = Some(value),
                "excludedattributes" => list_query.excluded_attributes = Some(value),
                _ => {}
            }
        }
        Ok(list_query)
    }

    /// Read a `SearchRequest` body.
    pub fn from_search_request(body: &Value) -> ScimResult<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| ScimError::invalid_syntax("SearchRequest body must be a JSON object"))?;

        let declares_schema = object
            .get("schemas")
            .and_then(Value::as_array)
            .is_some_and(|schemas| {
                schemas.iter().filter_map(Value::as_str).any(|uri| {
                    uri.eq_ignore_ascii_case(SEARCH_REQUEST_SCHEMA)
                })
            });
        if !declares_schema {
            return Err(ScimError::invalid_syntax(format!(
                "SearchRequest must declare schema {}",
                SEARCH_REQUEST_SCHEMA
            )));
        }

        Ok(Self {
            filter: string_member(object, "filter")?,
            sort_by: string_member(object, "sortBy")?,
            sort_order: string_member(object, "sortOrder")?
                .map(|order| parse_sort_order(&order))
                .transpose()?,
            start_index: integer_member(object, "startIndex")?,
            count: integer_member(object, "count")?,
            attributes: list_member(object, "attributes")?,
            excluded_attributes: list_member(object, "excludedAttributes")?,
        })
    }

    /// Clamp `startIndex`/`count` against the server limits.
    pub fn page_request(&self, default_count: usize, max_results: usize) -> PageRequest {
        PageRequest::new(self.start_index, self.count, default_count, max_results)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

fn parse_sort_order(value: &str) -> ScimResult<SortOrder> {
    value.parse().map_err(ScimError::invalid_syntax)
}

fn parse_integer(name: &str, value: &str) -> ScimResult<i64> {
    value.trim().parse().map_err(|_| {
        ScimError::invalid_syntax(format!("{} must be an integer, got '{}'", name, value))
    })
}

type Object = serde_json::Map<String, Value>;

fn string_member(object: &Object, name: &str) -> ScimResult<Option<String>> {
    match get_ignore_case(object, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ScimError::invalid_syntax(format!("{} must be a string", name))),
    }
}

fn integer_member(object: &Object, name: &str) -> ScimResult<Option<i64>> {
    match get_ignore_case(object, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ScimError::invalid_syntax(format!("{} must be an integer", name))),
        Some(Value::String(s)) => parse_integer(name, s).map(Some),
        Some(_) => Err(ScimError::invalid_syntax(format!("{} must be an integer", name))),
    }
}

/// Attribute lists may be a JSON array or a comma-separated string.
fn list_member(object: &Object, name: &str) -> ScimResult<Option<String>> {
    match get_ignore_case(object, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(Value::Array(items)) => {
            let names = items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        ScimError::invalid_syntax(format!("{} must contain strings", name))
                    })
                })
                .collect::<ScimResult<Vec<&str>>>()?;
            Ok(Some(names.join(",")))
        }
        Some(_) => Err(ScimError::invalid_syntax(format!(
            "{} must be an array of strings",
            name
        ))),
    }
}
