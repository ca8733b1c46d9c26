//! Schema registry for loading and accessing SCIM schemas.
//!
//! The registry is built once when the controller is constructed, from either
//! the embedded documents or a directory of host-supplied JSON files, and is
//! shared read-only afterwards.

use super::embedded;
use super::types::{
    AttributeDefinition, AttributeType, ResourceKind, ResourceType, Schema, SchemaExtension,
};
use crate::error::{BuildError, BuildResult};

use log::{debug, info};
use std::fs;
use std::path::Path;

/// URN of the enterprise User extension.
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// Registry of the schemas and resource types this provider serves.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
    user: ResourceType,
    group: ResourceType,
}

impl SchemaRegistry {
    /// Create a registry from the embedded schemas.
    pub fn new() -> BuildResult<Self> {
        Self::with_embedded_schemas()
    }

    /// Create a registry from the embedded User, Group and enterprise User schemas.
    pub fn with_embedded_schemas() -> BuildResult<Self> {
        Self::from_documents(
            embedded::core_user_schema(),
            embedded::core_group_schema(),
            Some(embedded::enterprise_user_schema()),
        )
    }

    /// Create a registry by loading `User.json`, `Group.json` and, when present,
    /// `EnterpriseUser.json` from a directory.
    pub fn from_schema_dir<P: AsRef<Path>>(schema_dir: P) -> BuildResult<Self> {
        let dir = schema_dir.as_ref();
        info!("Loading SCIM schemas from {}", dir.display());

        let user = read_document(&dir.join("User.json"))?;
        let group = read_document(&dir.join("Group.json"))?;
        let enterprise_path = dir.join("EnterpriseUser.json");
        let enterprise = if enterprise_path.is_file() {
            Some(read_document(&enterprise_path)?)
        } else {
            None
        };

        Self::from_documents(&user, &group, enterprise.as_deref())
    }

    /// Create a registry from schema documents held in memory.
    pub fn from_documents(
        user_document: &str,
        group_document: &str,
        enterprise_document: Option<&str>,
    ) -> BuildResult<Self> {
        let common = load_common_attributes()?;
        let user_schema = Self::load_schema_from_str(user_document)?;
        let group_schema = Self::load_schema_from_str(group_document)?;
        let enterprise = enterprise_document
            .map(Self::load_schema_from_str)
            .transpose()?
            .map(|mut schema| {
                let urn = schema.id.clone();
                for attr in &mut schema.attributes {
                    assign_paths(attr, Some(&urn), None);
                }
                schema
            });

        let mut schemas = vec![user_schema.clone()];
        let mut user_extensions = Vec::new();
        if let Some(enterprise) = enterprise {
            schemas.push(enterprise.clone());
            user_extensions.push(SchemaExtension {
                schema: enterprise,
                required: false,
            });
        }
        schemas.push(group_schema.clone());

        let user = ResourceType {
            kind: ResourceKind::User,
            description: "User Account".to_string(),
            common: common.clone(),
            schema: user_schema,
            extensions: user_extensions,
        };
        let group = ResourceType {
            kind: ResourceKind::Group,
            description: "Group".to_string(),
            common,
            schema: group_schema,
            extensions: Vec::new(),
        };

        debug!("Schema registry holds {} schemas", schemas.len());
        Ok(Self {
            schemas,
            user,
            group,
        })
    }

    /// Parse and check a single schema document.
    pub fn load_schema_from_str(content: &str) -> BuildResult<Schema> {
        let mut schema: Schema = serde_json::from_str(content)?;
        check_schema(&schema)?;

        for attr in &mut schema.attributes {
            assign_paths(attr, None, None);
        }
        Ok(schema)
    }

    /// All schemas, core User first.
    pub fn get_schemas(&self) -> Vec<&Schema> {
        self.schemas.iter().collect()
    }

    /// Look up a schema by URN, ignoring case.
    pub fn get_schema(&self, id: &str) -> Option<&Schema> {
        self.schemas
            .iter()
            .find(|schema| schema.id.eq_ignore_ascii_case(id))
    }

    pub fn resource_type(&self, kind: ResourceKind) -> &ResourceType {
        match kind {
            ResourceKind::User => &self.user,
            ResourceKind::Group => &self.group,
        }
    }

    pub fn resource_types(&self) -> [&ResourceType; 2] {
        [&self.user, &self.group]
    }
}

fn read_document(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(|source| BuildError::SchemaIo {
        path: path.display().to_string(),
        source,
    })
}

fn load_common_attributes() -> BuildResult<Vec<AttributeDefinition>> {
    let mut common: Vec<AttributeDefinition> =
        serde_json::from_str(embedded::common_attributes())?;
    for attr in &mut common {
        assign_paths(attr, None, None);
    }
    Ok(common)
}

fn check_schema(schema: &Schema) -> BuildResult<()> {
    if schema.id.is_empty() {
        return Err(BuildError::invalid_schema("", "schema id cannot be empty"));
    }
    if !schema.id.to_ascii_lowercase().starts_with("urn:") {
        return Err(BuildError::invalid_schema(
            &schema.id,
            "schema id must be a URN",
        ));
    }
    if schema.name.is_empty() {
        return Err(BuildError::invalid_schema(
            &schema.id,
            "schema name cannot be empty",
        ));
    }
    check_attributes(&schema.id, &schema.attributes, false)
}

fn check_attributes(
    schema_id: &str,
    attributes: &[AttributeDefinition],
    nested: bool,
) -> BuildResult<()> {
    for (i, attr) in attributes.iter().enumerate() {
        if attr.name.is_empty() {
            return Err(BuildError::invalid_schema(
                schema_id,
                "attribute name cannot be empty",
            ));
        }
        if attributes[..i]
            .iter()
            .any(|other| other.name.eq_ignore_ascii_case(&attr.name))
        {
            return Err(BuildError::invalid_schema(
                schema_id,
                format!("duplicate attribute '{}'", attr.name),
            ));
        }
        match attr.data_type {
            AttributeType::Complex if nested => {
                return Err(BuildError::invalid_schema(
                    schema_id,
                    format!("sub-attribute '{}' cannot be complex", attr.name),
                ));
            }
            AttributeType::Complex if attr.sub_attributes.is_empty() => {
                return Err(BuildError::invalid_schema(
                    schema_id,
                    format!("complex attribute '{}' has no sub-attributes", attr.name),
                ));
            }
            AttributeType::Complex => check_attributes(schema_id, &attr.sub_attributes, true)?,
            _ if !attr.sub_attributes.is_empty() => {
                return Err(BuildError::invalid_schema(
                    schema_id,
                    format!("non-complex attribute '{}' has sub-attributes", attr.name),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Fill in `path` for an attribute and its sub-attributes. Core attributes
/// get bare paths; extension attributes are qualified by their URN.
fn assign_paths(attr: &mut AttributeDefinition, urn: Option<&str>, parent: Option<&str>) {
    attr.path = match (parent, urn) {
        (Some(parent), _) => format!("{}.{}", parent, attr.name),
        (None, Some(urn)) => format!("{}:{}", urn, attr.name),
        (None, None) => attr.name.clone(),
    };
    let parent = attr.path.clone();
    for sub in &mut attr.sub_attributes {
        assign_paths(sub, urn, Some(&parent));
    }
}
