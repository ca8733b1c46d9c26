//! Maps HTTP-shaped requests onto controller operations.
//!
//! Routes, relative to the base URL:
//!
//! | Path | Methods |
//! |---|---|
//! | `/ServiceProviderConfig` | GET |
//! | `/ResourceTypes`, `/ResourceTypes/{id}` | GET |
//! | `/Schemas`, `/Schemas/{id}` | GET |
//! | `/Users`, `/Groups` | GET (list), POST (create) |
//! | `/Users/.search`, `/Groups/.search` | POST |
//! | `/Users/{id}`, `/Groups/{id}` | GET, PUT, PATCH, DELETE |

use super::{ScimController, ScimRequest, ScimResponse};
use crate::error::{ScimError, ScimResult};
use crate::list::{ListQuery, Page};
use crate::patch::PatchRequest;
use crate::resource::{AttributeSelection, Resource};
use crate::schema::ResourceKind;
use crate::storage::StorageProvider;
use http::{Method, StatusCode};
use log::{info, trace, warn};
use serde_json::Value;

const REQUEST_ID_HEADER: &str = "x-request-id";

impl<S: StorageProvider> ScimController<S> {
    /// Handle one request. Every failure becomes a SCIM error response.
    pub async fn handle(&self, mut request: ScimRequest) -> ScimResponse {
        let request_id = request
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!(
            "SCIM {} {} (request: '{}')",
            request.method, request.path, request_id
        );
        if let Some(body) = &request.body {
            trace!("Request body (request: '{}'): {}", request_id, body);
        }

        let response = match self.dispatch(&mut request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "SCIM {} {} failed with {}: {} (request: '{}')",
                    request.method,
                    request.path,
                    e.status().as_u16(),
                    e,
                    request_id
                );
                ScimResponse::from_error(&e)
            }
        };

        if let Some(body) = &response.body {
            trace!(
                "Response {} (request: '{}'): {}",
                response.status.as_u16(),
                request_id,
                body
            );
        }
        response
    }

    async fn dispatch(&self, request: &mut ScimRequest) -> ScimResult<ScimResponse> {
        let path = self.relative_path(&request.path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let method = request.method.clone();
        let not_allowed = || ScimError::MethodNotAllowed {
            method: method.to_string(),
            path: path.clone(),
        };

        match segments.as_slice() {
            [root] if root.eq_ignore_ascii_case("ServiceProviderConfig") => match method {
                Method::GET => Ok(ScimResponse::ok(self.service_provider_config())),
                _ => Err(not_allowed()),
            },
            [root, rest @ ..] if root.eq_ignore_ascii_case("ResourceTypes") && rest.len() <= 1 => {
                if method != Method::GET {
                    return Err(not_allowed());
                }
                match rest {
                    [] => Ok(ScimResponse::ok(self.resource_types().to_list_response())),
                    [id] => Ok(ScimResponse::ok(self.resource_type(id)?)),
                    _ => Err(ScimError::NotFound(path.clone())),
                }
            }
            [root, rest @ ..] if root.eq_ignore_ascii_case("Schemas") && rest.len() <= 1 => {
                if method != Method::GET {
                    return Err(not_allowed());
                }
                match rest {
                    [] => Ok(ScimResponse::ok(self.schemas().to_list_response())),
                    [id] => Ok(ScimResponse::ok(self.schema(id)?)),
                    _ => Err(ScimError::NotFound(path.clone())),
                }
            }
            [endpoint] => {
                let kind = resource_kind(endpoint, &path)?;
                match method {
                    Method::GET => {
                        let query = ListQuery::from_query(request.query.as_deref().unwrap_or(""))?;
                        Ok(list_response(self.search(kind, &query).await?))
                    }
                    Method::POST => {
                        let selection = selection(request)?;
                        let body = request.take_body()?;
                        let created = self.create(kind, body).await?;
                        Ok(self.resource_response(StatusCode::CREATED, &created, &selection))
                    }
                    _ => Err(not_allowed()),
                }
            }
            [endpoint, search] if *search == ".search" => {
                let kind = resource_kind(endpoint, &path)?;
                if method != Method::POST {
                    return Err(not_allowed());
                }
                let body = request.take_body()?;
                let query = ListQuery::from_search_request(&body)?;
                Ok(list_response(self.search(kind, &query).await?))
            }
            [endpoint, id] => {
                let kind = resource_kind(endpoint, &path)?;
                let selection = selection(request)?;
                let resource = match method {
                    Method::GET => self.get(kind, id).await?,
                    Method::PUT => {
                        let if_match = request.if_match()?;
                        let body = request.take_body()?;
                        self.replace(kind, id, body, if_match.as_ref()).await?
                    }
                    Method::PATCH => {
                        let if_match = request.if_match()?;
                        let patch = PatchRequest::from_json(request.take_body()?)?;
                        self.patch(kind, id, &patch, if_match.as_ref()).await?
                    }
                    Method::DELETE => {
                        let if_match = request.if_match()?;
                        self.delete(kind, id, if_match.as_ref()).await?;
                        return Ok(ScimResponse::no_content());
                    }
                    _ => return Err(not_allowed()),
                };
                Ok(self.resource_response(StatusCode::OK, &resource, &selection))
            }
            _ => Err(ScimError::NotFound(path.clone())),
        }
    }

    /// The request path below the base URL's path, if it carries that prefix.
    fn relative_path(&self, path: &str) -> String {
        let base_path = url::Url::parse(self.config.base_url())
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let relative = if base_path.is_empty() {
            path
        } else {
            path.strip_prefix(base_path.as_str())
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(path)
        };
        format!("/{}", relative.trim_start_matches('/'))
    }

    /// A single resource, projected, with `ETag` and, on create, `Location`.
    fn resource_response(
        &self,
        status: StatusCode,
        resource: &Resource,
        selection: &AttributeSelection,
    ) -> ScimResponse {
        let resource_type = self.mapper(resource.kind()).resource_type();
        let body = selection.apply(&resource.to_json(), resource_type);
        let mut response = ScimResponse::json(status, body);

        if let Some(meta) = resource.meta() {
            if let Some(version) = meta.parsed_version() {
                response = response.with_etag(&version);
            }
            if status == StatusCode::CREATED {
                if let Some(location) = &meta.location {
                    response = response.with_location(location);
                }
            }
        }
        response
    }
}

fn resource_kind(endpoint: &str, path: &str) -> ScimResult<ResourceKind> {
    ResourceKind::from_endpoint(endpoint).ok_or_else(|| ScimError::NotFound(path.to_string()))
}

/// `attributes`/`excludedAttributes` from the query string.
fn selection(request: &ScimRequest) -> ScimResult<AttributeSelection> {
    let query = ListQuery::from_query(request.query.as_deref().unwrap_or(""))?;
    AttributeSelection::parse(
        query.attributes.as_deref(),
        query.excluded_attributes.as_deref(),
    )
    .map_err(|e| ScimError::invalid_syntax(format!("Invalid attribute list: {}", e)))
}

fn list_response(page: Page<Value>) -> ScimResponse {
    ScimResponse::ok(page.to_list_response())
}
