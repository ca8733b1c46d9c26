//! Core schema type definitions for SCIM resources.
//!
//! These structures mirror the RFC 7643 §7 schema representation so schema
//! documents deserialize straight into them and serialize back out unchanged
//! for the `/Schemas` discovery endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A SCIM schema definition.
///
/// Immutable once loaded into the registry; every request shares it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier (URN)
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// Ordered attribute definitions
    pub attributes: Vec<AttributeDefinition>,
}

impl Schema {
    /// Find a top-level attribute, ignoring case as RFC 7643 §2.1 requires.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }
}

/// Definition of a SCIM attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Fully qualified path, e.g. `name.givenName` or
    /// `urn:...:enterprise:2.0:User:manager.value`. Filled in by the registry.
    #[serde(skip)]
    pub path: String,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Whether string comparison is case-sensitive
    #[serde(default)]
    pub case_exact: bool,
    #[serde(default)]
    pub mutability: Mutability,
    #[serde(default)]
    pub returned: Returned,
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Allowed values for string attributes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_types: Vec<String>,
    /// Sub-attributes for complex types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<AttributeDefinition>,
}

impl AttributeDefinition {
    pub fn is_complex(&self) -> bool {
        self.data_type == AttributeType::Complex
    }

    /// Find a sub-attribute by name, ignoring case.
    pub fn sub_attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.sub_attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Clients may write this attribute at all.
    pub fn is_writable(&self) -> bool {
        self.mutability != Mutability::ReadOnly
    }
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            data_type: AttributeType::String,
            multi_valued: false,
            description: String::new(),
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
        }
    }
}

/// SCIM attribute data types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    #[default]
    String,
    Boolean,
    Decimal,
    Integer,
    /// xsd:dateTime, validated as RFC 3339
    DateTime,
    /// Base64 encoded bytes
    Binary,
    Reference,
    Complex,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::DateTime => "dateTime",
            Self::Binary => "binary",
            Self::Reference => "reference",
            Self::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// Attribute mutability characteristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Managed by the server
    ReadOnly,
    #[default]
    ReadWrite,
    /// Writable until it holds a non-null value
    Immutable,
    /// Never returned (passwords)
    WriteOnly,
}

/// When an attribute appears in responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    Always,
    Never,
    #[default]
    Default,
    Request,
}

/// Attribute uniqueness constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    #[default]
    None,
    Server,
    Global,
}

/// The resource types this provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    User,
    Group,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::User, ResourceKind::Group];

    /// Resource type name as it appears in `meta.resourceType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }

    /// Endpoint segment, without the leading slash.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::User => "Users",
            Self::Group => "Groups",
        }
    }

    pub fn from_endpoint(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.endpoint().eq_ignore_ascii_case(segment))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extension schema attached to a resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaExtension {
    pub schema: Schema,
    pub required: bool,
}

/// A resource type with its schemas resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType {
    pub kind: ResourceKind,
    pub description: String,
    /// `id`, `externalId` and `meta`, shared by every resource type
    pub common: Vec<AttributeDefinition>,
    pub schema: Schema,
    pub extensions: Vec<SchemaExtension>,
}

/// Which part of a resource an attribute lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeScope<'a> {
    /// Common or core schema attribute at the top level
    Core,
    /// Attribute inside the extension object keyed by this URN
    Extension(&'a str),
}

/// A top-level attribute located within a resource type.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAttribute<'a> {
    pub scope: AttributeScope<'a>,
    pub definition: &'a AttributeDefinition,
}

impl ResourceType {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn endpoint(&self) -> String {
        format!("/{}", self.kind.endpoint())
    }

    /// Look up an extension by URN, ignoring case.
    pub fn extension(&self, urn: &str) -> Option<&SchemaExtension> {
        self.extensions
            .iter()
            .find(|ext| ext.schema.id.eq_ignore_ascii_case(urn))
    }

    pub fn is_core_urn(&self, urn: &str) -> bool {
        self.schema.id.eq_ignore_ascii_case(urn)
    }

    /// Core URN followed by extension URNs in registration order.
    pub fn schema_urns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.schema.id.as_str())
            .chain(self.extensions.iter().map(|ext| ext.schema.id.as_str()))
    }

    /// Resolve a top-level attribute name, optionally qualified by a schema URN.
    ///
    /// Unqualified names are looked up in the common attributes and then the
    /// core schema only.
    pub fn resolve(&self, urn: Option<&str>, name: &str) -> Option<ResolvedAttribute<'_>> {
        match urn {
            Some(urn) if !self.is_core_urn(urn) => {
                let ext = self.extension(urn)?;
                ext.schema.attribute(name).map(|definition| ResolvedAttribute {
                    scope: AttributeScope::Extension(&ext.schema.id),
                    definition,
                })
            }
            _ => self
                .common
                .iter()
                .find(|attr| attr.name.eq_ignore_ascii_case(name))
                .or_else(|| self.schema.attribute(name))
                .map(|definition| ResolvedAttribute {
                    scope: AttributeScope::Core,
                    definition,
                }),
        }
    }

    /// Every top-level attribute with its scope: common, core, then extensions.
    pub fn all_attributes(&self) -> impl Iterator<Item = ResolvedAttribute<'_>> {
        let core = self
            .common
            .iter()
            .chain(self.schema.attributes.iter())
            .map(|definition| ResolvedAttribute {
                scope: AttributeScope::Core,
                definition,
            });
        let extensions = self.extensions.iter().flat_map(|ext| {
            ext.schema
                .attributes
                .iter()
                .map(move |definition| ResolvedAttribute {
                    scope: AttributeScope::Extension(&ext.schema.id),
                    definition,
                })
        });
        core.chain(extensions)
    }
}
