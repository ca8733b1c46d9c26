//! Discovery endpoints: ServiceProviderConfig, ResourceTypes and Schemas
//! (RFC 7644 §4).

use super::ScimController;
use crate::error::{ScimError, ScimResult};
use crate::list::Page;
use crate::schema::{ResourceType, Schema};
use crate::storage::StorageProvider;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const SERVICE_PROVIDER_CONFIG_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";
pub const RESOURCE_TYPE_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";
pub const SCHEMA_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Schema";

/// Service provider configuration as defined in RFC 7643 §5.
///
/// This structure describes the capabilities of the provider, allowing
/// clients to discover what features are supported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_uri: Option<String>,
    pub patch: Supported,
    pub bulk: BulkSupport,
    pub filter: FilterSupport,
    pub change_password: Supported,
    pub sort: Supported,
    pub etag: Supported,
    pub authentication_schemes: Vec<AuthenticationScheme>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supported {
    pub supported: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkSupport {
    pub supported: bool,
    /// Maximum number of operations in a bulk request
    pub max_operations: u32,
    /// Maximum payload size in bytes
    pub max_payload_size: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSupport {
    pub supported: bool,
    /// Maximum number of resources returned in a query
    pub max_results: usize,
}

/// Authentication scheme definition for service provider config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationScheme {
    /// Authentication type (e.g., "oauthbearertoken", "httpbasic")
    #[serde(rename = "type")]
    pub auth_type: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_uri: Option<String>,
    /// Whether this scheme is the primary authentication method
    pub primary: bool,
}

impl AuthenticationScheme {
    /// OAuth 2.0 bearer tokens; the host validates them before the request
    /// reaches the controller.
    pub fn oauth_bearer_token() -> Self {
        Self {
            auth_type: "oauthbearertoken".to_string(),
            name: "OAuth Bearer Token".to_string(),
            description: "Authentication scheme using the OAuth Bearer Token Standard"
                .to_string(),
            spec_uri: Some("https://www.rfc-editor.org/info/rfc6750".to_string()),
            documentation_uri: None,
            primary: true,
        }
    }
}

impl ServiceProviderConfig {
    pub fn new(max_results: usize, documentation_uri: Option<String>) -> Self {
        Self {
            documentation_uri,
            patch: Supported { supported: true },
            bulk: BulkSupport {
                supported: false,
                max_operations: 1000,
                max_payload_size: 1_048_576,
            },
            filter: FilterSupport {
                supported: true,
                max_results,
            },
            change_password: Supported { supported: false },
            sort: Supported { supported: true },
            etag: Supported { supported: true },
            authentication_schemes: vec![AuthenticationScheme::oauth_bearer_token()],
        }
    }
}

impl<S: StorageProvider> ScimController<S> {
    /// `GET /ServiceProviderConfig`
    pub fn service_provider_config(&self) -> Value {
        let mut body = serde_json::to_value(&self.service_config).unwrap_or_else(|_| json!({}));
        body["schemas"] = json!([SERVICE_PROVIDER_CONFIG_SCHEMA]);
        body["meta"] = json!({
            "resourceType": "ServiceProviderConfig",
            "location": format!("{}/ServiceProviderConfig", self.config.base_url()),
        });
        body
    }

    /// `GET /ResourceTypes`
    pub fn resource_types(&self) -> Page<Value> {
        let resources: Vec<Value> = self
            .registry
            .resource_types()
            .into_iter()
            .map(|rt| self.resource_type_json(rt))
            .collect();
        whole_page(resources)
    }

    /// `GET /ResourceTypes/{id}`
    pub fn resource_type(&self, id: &str) -> ScimResult<Value> {
        self.registry
            .resource_types()
            .into_iter()
            .find(|rt| rt.name().eq_ignore_ascii_case(id))
            .map(|rt| self.resource_type_json(rt))
            .ok_or_else(|| ScimError::NotFound(format!("ResourceType {}", id)))
    }

    /// `GET /Schemas`
    pub fn schemas(&self) -> Page<Value> {
        let resources: Vec<Value> = self
            .registry
            .get_schemas()
            .into_iter()
            .map(|schema| self.schema_json(schema))
            .collect();
        whole_page(resources)
    }

    /// `GET /Schemas/{id}`
    pub fn schema(&self, id: &str) -> ScimResult<Value> {
        self.registry
            .get_schema(id)
            .map(|schema| self.schema_json(schema))
            .ok_or_else(|| ScimError::NotFound(format!("Schema {}", id)))
    }

    fn resource_type_json(&self, resource_type: &ResourceType) -> Value {
        let extensions: Vec<Value> = resource_type
            .extensions
            .iter()
            .map(|ext| json!({ "schema": ext.schema.id, "required": ext.required }))
            .collect();
        json!({
            "schemas": [RESOURCE_TYPE_SCHEMA],
            "id": resource_type.name(),
            "name": resource_type.name(),
            "endpoint": resource_type.endpoint(),
            "description": resource_type.description,
            "schema": resource_type.schema.id,
            "schemaExtensions": extensions,
            "meta": {
                "resourceType": "ResourceType",
                "location": format!("{}/ResourceTypes/{}", self.config.base_url(), resource_type.name()),
            }
        })
    }

    fn schema_json(&self, schema: &Schema) -> Value {
        let mut body = serde_json::to_value(schema).unwrap_or_else(|_| json!({}));
        body["schemas"] = json!([SCHEMA_SCHEMA]);
        body["meta"] = json!({
            "resourceType": "Schema",
            "location": format!("{}/Schemas/{}", self.config.base_url(), schema.id),
        });
        body
    }
}

fn whole_page(resources: Vec<Value>) -> Page<Value> {
    Page {
        total_results: resources.len(),
        items_per_page: resources.len(),
        start_index: 1,
        resources,
    }
}
