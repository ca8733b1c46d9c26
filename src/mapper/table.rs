//! Correspondence table between SCIM attribute paths and store fields.

use super::record::fields;
use crate::schema::ResourceKind;

/// How a SCIM attribute binds to a store field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A top-level attribute, e.g. `userName`
    Attribute(&'static str),
    /// A sub-attribute of a single-valued complex attribute, e.g. `name.givenName`
    SubAttribute(&'static str, &'static str),
    /// The `value` of the primary (or first) element of a multi-valued
    /// attribute, e.g. `emails[primary eq true].value`
    PrimaryValue(&'static str),
}

impl Binding {
    /// The top-level attribute the binding lives under.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Attribute(name) | Self::SubAttribute(name, _) | Self::PrimaryValue(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub binding: Binding,
    pub store_field: &'static str,
}

const fn mapping(binding: Binding, store_field: &'static str) -> FieldMapping {
    FieldMapping {
        binding,
        store_field,
    }
}

/// The fixed mapping for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<FieldMapping>,
}

impl MappingTable {
    /// User mapping. With `email_as_username` the store keys users by email:
    /// `userName` is written to the email field and `emails` stays generic.
    pub fn users(email_as_username: bool) -> Self {
        let mut entries = Vec::new();
        if email_as_username {
            entries.push(mapping(Binding::Attribute("userName"), fields::EMAIL));
        } else {
            entries.push(mapping(Binding::Attribute("userName"), fields::USERNAME));
            entries.push(mapping(Binding::PrimaryValue("emails"), fields::EMAIL));
        }
        entries.extend([
            mapping(Binding::SubAttribute("name", "givenName"), fields::FIRST_NAME),
            mapping(Binding::SubAttribute("name", "familyName"), fields::LAST_NAME),
            mapping(Binding::Attribute("active"), fields::ENABLED),
            mapping(Binding::Attribute("password"), fields::PASSWORD),
        ]);
        Self { entries }
    }

    pub fn groups() -> Self {
        Self {
            entries: vec![
                mapping(Binding::Attribute("displayName"), fields::GROUP_NAME),
                mapping(Binding::Attribute("members"), fields::MEMBERS),
            ],
        }
    }

    pub fn for_kind(kind: ResourceKind, email_as_username: bool) -> Self {
        match kind {
            ResourceKind::User => Self::users(email_as_username),
            ResourceKind::Group => Self::groups(),
        }
    }

    pub fn entries(&self) -> &[FieldMapping] {
        &self.entries
    }

    /// Store field backing a top-level attribute, when it maps directly.
    pub fn field_for_attribute(&self, name: &str) -> Option<&'static str> {
        self.entries.iter().find_map(|entry| match entry.binding {
            Binding::Attribute(attr) if attr.eq_ignore_ascii_case(name) => Some(entry.store_field),
            _ => None,
        })
    }
}
