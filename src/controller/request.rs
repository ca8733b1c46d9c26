//! Transport-neutral SCIM requests.

use crate::error::{ScimError, ScimResult};
use crate::resource::IfMatch;
use http::header::{HeaderName, HeaderValue, IF_MATCH};
use http::{HeaderMap, Method};
use serde_json::Value;

/// An inbound SCIM request, as an HTTP adapter hands it to the controller.
///
/// `path` is relative to the SCIM root (`/Users/2819c223`), though a path
/// that still carries the configured base URL's path prefix is accepted too.
#[derive(Debug, Clone)]
pub struct ScimRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ScimRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path, None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header. Names or values that are not valid HTTP are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_if_match(self, etag: &str) -> Self {
        self.with_header(IF_MATCH.as_str(), etag)
    }

    /// The parsed `If-Match` header, if one was sent.
    pub fn if_match(&self) -> ScimResult<Option<IfMatch>> {
        let Some(header) = self.headers.get(IF_MATCH) else {
            return Ok(None);
        };
        let header = header
            .to_str()
            .map_err(|_| ScimError::invalid_syntax("If-Match header is not valid text"))?;
        header
            .parse()
            .map(Some)
            .map_err(|e| ScimError::invalid_syntax(format!("{}", e)))
    }

    /// The body, or an `invalidSyntax` error for methods that need one.
    pub(crate) fn take_body(&mut self) -> ScimResult<Value> {
        self.body
            .take()
            .ok_or_else(|| ScimError::invalid_syntax("Request body is required"))
    }
}
