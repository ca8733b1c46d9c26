//! Transport-neutral SCIM responses.

use crate::error::ScimError;
use crate::resource::Version;
use http::header::{CONTENT_TYPE, ETAG, HeaderValue, LOCATION};
use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// Media type of every SCIM body (RFC 7644 §3.1).
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// The controller's answer to a [`ScimRequest`](super::ScimRequest).
#[derive(Debug, Clone)]
pub struct ScimResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ScimResponse {
    /// A response carrying a JSON body.
    pub fn json(status: StatusCode, body: Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(SCIM_CONTENT_TYPE));
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn created(body: Value) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// The RFC 7644 §3.12 error body for `error`.
    pub fn from_error(error: &ScimError) -> Self {
        Self::json(error.status(), error.to_error_body())
    }

    pub fn with_etag(mut self, version: &Version) -> Self {
        if let Ok(value) = HeaderValue::from_str(&version.to_etag()) {
            self.headers.insert(ETAG, value);
        }
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(location) {
            self.headers.insert(LOCATION, value);
        }
        self
    }

    pub fn etag(&self) -> Option<&str> {
        self.headers.get(ETAG).and_then(|value| value.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|value| value.to_str().ok())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body, or `Value::Null` for bodiless responses.
    pub fn body(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.body.as_ref().unwrap_or(&NULL)
    }
}
