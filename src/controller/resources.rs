//! CRUD and search over Users and Groups.
//!
//! Each operation walks resolve → precondition → execute: the current
//! record is read once, `If-Match` is checked against its version, and the
//! write hands that same version to the store so a concurrent writer that
//! slipped in between is still caught.

use super::ScimController;
use crate::error::{ScimError, ScimResult, ValidationError};
use crate::filter::{FilterExpression, parse_attribute_path};
use crate::list::{ListQuery, Page, paginate, sort_resources};
use crate::mapper::{Prior, StoreRecord, fields};
use crate::patch::{PatchEngine, PatchRequest};
use crate::resource::{AttributeSelection, IfMatch, Resource, Version, get_ignore_case};
use crate::schema::{AttributeScope, Mutability, ResourceKind, Uniqueness};
use crate::storage::{StorageKey, StorageProvider};
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// User id -> the `groups` entries of that user.
type Memberships = HashMap<String, Vec<Value>>;

/// A resource as currently stored.
struct Current {
    record: StoreRecord,
    representation: Resource,
    version: Version,
}

impl<S: StorageProvider> ScimController<S> {
    /// Create a resource. The store assigns `id`, timestamps and version.
    pub async fn create(&self, kind: ResourceKind, body: Value) -> ScimResult<Resource> {
        let mapper = self.mapper(kind);
        let mut resource = mapper.prepare(body)?;
        resource.set_id(None);

        self.check_uniqueness(kind, &resource, None).await?;
        let record = mapper.to_store_record(&resource, None)?;
        let created = self.storage.create(kind, record).await?;
        debug!(
            "Created {} {}",
            kind,
            created.id.as_deref().unwrap_or_default()
        );
        self.represent(kind, &created).await
    }

    /// Fetch one resource.
    pub async fn get(&self, kind: ResourceKind, id: &str) -> ScimResult<Resource> {
        Ok(self.load(kind, id).await?.representation)
    }

    /// Filter, sort, paginate and project.
    pub async fn search(&self, kind: ResourceKind, query: &ListQuery) -> ScimResult<Page<Value>> {
        let resource_type = self.mapper(kind).resource_type();

        let filter = query
            .filter
            .as_deref()
            .map(FilterExpression::parse)
            .transpose()?;
        if let Some(filter) = &filter {
            let unknown = filter.unknown_paths(resource_type);
            if !unknown.is_empty() {
                return Err(ScimError::UnsupportedFilter {
                    message: format!(
                        "{} has no attribute(s) {}",
                        kind,
                        unknown.join(", ")
                    ),
                });
            }
        }
        let sort_by = query
            .sort_by
            .as_deref()
            .map(parse_attribute_path)
            .transpose()
            .map_err(|e| ScimError::invalid_syntax(format!("Invalid sortBy: {}", e)))?;
        let selection = AttributeSelection::parse(
            query.attributes.as_deref(),
            query.excluded_attributes.as_deref(),
        )
        .map_err(|e| ScimError::invalid_syntax(format!("Invalid attribute list: {}", e)))?;

        let memberships = self.memberships(kind).await?;
        let render = |record: &StoreRecord| self.render(kind, record, &memberships).to_json();
        let records = self
            .storage
            .find_by_filter(kind, &|record: &StoreRecord| {
                filter
                    .as_ref()
                    .is_none_or(|filter| filter.evaluate(&render(record), resource_type))
            })
            .await?;

        let mut representations: Vec<Value> = records.iter().map(render).collect();
        if let Some(sort_by) = &sort_by {
            sort_resources(
                &mut representations,
                sort_by,
                query.sort_order(),
                resource_type,
            );
        }

        let page = paginate(
            representations,
            query.page_request(self.config.default_count, self.config.max_results),
        );
        debug!(
            "Search over {} matched {}, returning {} from {}",
            kind.endpoint(),
            page.total_results,
            page.items_per_page,
            page.start_index
        );
        Ok(page.map(|resource| selection.apply(&resource, resource_type)))
    }

    /// PUT: replace every client-writable attribute.
    pub async fn replace(
        &self,
        kind: ResourceKind,
        id: &str,
        body: Value,
        if_match: Option<&IfMatch>,
    ) -> ScimResult<Resource> {
        let current = self.load(kind, id).await?;
        self.check_precondition(&current.version, if_match)?;

        let mut resource = self.mapper(kind).prepare(body)?;
        match resource.id() {
            Some(body_id) if body_id != id => {
                return Err(ValidationError::ReadOnlyViolation {
                    attribute: "id".to_string(),
                }
                .into());
            }
            _ => resource.set_id(Some(id.to_string())),
        }
        self.write(kind, id, &current, &resource).await
    }

    /// PATCH: apply the operations to the current representation and store
    /// the result. Nothing is written when the operations change nothing.
    pub async fn patch(
        &self,
        kind: ResourceKind,
        id: &str,
        request: &PatchRequest,
        if_match: Option<&IfMatch>,
    ) -> ScimResult<Resource> {
        let current = self.load(kind, id).await?;
        self.check_precondition(&current.version, if_match)?;

        if request.operations.is_empty() {
            debug!("Empty PATCH on {} {}", kind, id);
            return Ok(current.representation);
        }

        let engine = PatchEngine::new(self.mapper(kind).resource_type());
        let patched = engine.apply(&current.representation, &request.operations)?;
        if patched == current.representation {
            debug!("PATCH on {} {} changed nothing", kind, id);
            return Ok(current.representation);
        }
        self.write(kind, id, &current, &patched).await
    }

    /// DELETE. A missing resource is a 404, even on a repeated delete.
    pub async fn delete(
        &self,
        kind: ResourceKind,
        id: &str,
        if_match: Option<&IfMatch>,
    ) -> ScimResult<()> {
        let mut expected = None;
        if if_match.is_some() || self.config.require_if_match {
            let (_, version) = self.find_record(kind, id).await?;
            self.check_precondition(&version, if_match)?;
            // a write between the check and the delete must not be lost
            if matches!(if_match, Some(IfMatch::Tags(_))) {
                expected = Some(version);
            }
        }
        let key = StorageKey::new(kind, id);
        if !self.storage.delete(key, expected.as_ref()).await? {
            return Err(ScimError::resource_not_found(kind.as_str(), id));
        }
        debug!("Deleted {} {}", kind, id);
        Ok(())
    }

    async fn find_record(&self, kind: ResourceKind, id: &str) -> ScimResult<(StoreRecord, Version)> {
        let record = self
            .storage
            .find_by_id(StorageKey::new(kind, id))
            .await?
            .ok_or_else(|| ScimError::resource_not_found(kind.as_str(), id))?;
        let version = record.version.clone().ok_or_else(|| {
            ScimError::internal(format!("Store returned {} {} without a version", kind, id))
        })?;
        Ok((record, version))
    }

    async fn load(&self, kind: ResourceKind, id: &str) -> ScimResult<Current> {
        let (record, version) = self.find_record(kind, id).await?;
        debug!("Resolved {} {} at version {}", kind, id, version);
        let representation = self.represent(kind, &record).await?;
        Ok(Current {
            record,
            representation,
            version,
        })
    }

    fn check_precondition(&self, current: &Version, if_match: Option<&IfMatch>) -> ScimResult<()> {
        match if_match {
            Some(if_match) if !if_match.matches(current) => Err(ScimError::precondition_failed(
                format!("resource is at version {}", current.to_etag()),
            )),
            None if self.config.require_if_match => Err(ScimError::precondition_failed(
                "If-Match header is required",
            )),
            _ => Ok(()),
        }
    }

    /// Validate, map and store an updated representation.
    async fn write(
        &self,
        kind: ResourceKind,
        id: &str,
        current: &Current,
        resource: &Resource,
    ) -> ScimResult<Resource> {
        self.check_uniqueness(kind, resource, Some(id)).await?;
        let prior = Prior {
            record: &current.record,
            representation: &current.representation,
        };
        let record = self.mapper(kind).to_store_record(resource, Some(prior))?;
        let updated = self
            .storage
            .update(StorageKey::new(kind, id), record, &current.version)
            .await?;
        debug!(
            "Updated {} {} to version {}",
            kind,
            id,
            updated.version.as_ref().map(Version::as_str).unwrap_or_default()
        );
        self.represent(kind, &updated).await
    }

    /// Reject values of `server`/`global` unique attributes that another
    /// resource of the same type already holds.
    async fn check_uniqueness(
        &self,
        kind: ResourceKind,
        resource: &Resource,
        own_id: Option<&str>,
    ) -> ScimResult<()> {
        let mapper = self.mapper(kind);
        let unique = mapper.resource_type().all_attributes().filter(|resolved| {
            let def = resolved.definition;
            def.uniqueness != Uniqueness::None
                && def.mutability != Mutability::ReadOnly
                && !def.multi_valued
                && !def.is_complex()
        });

        for resolved in unique {
            let def = resolved.definition;
            let Some(Value::String(value)) = scoped_value(resource, resolved.scope, &def.name)
            else {
                continue;
            };
            let same = |other: &str| {
                if def.case_exact {
                    other == value
                } else {
                    other.to_lowercase() == value.to_lowercase()
                }
            };

            let clashes = self
                .storage
                .find_by_filter(kind, &|record: &StoreRecord| {
                    if own_id.is_some() && record.id.as_deref() == own_id {
                        return false;
                    }
                    let existing = mapper.to_representation(record);
                    scoped_value(&existing, resolved.scope, &def.name)
                        .and_then(Value::as_str)
                        .is_some_and(same)
                })
                .await?;
            if !clashes.is_empty() {
                return Err(ScimError::Conflict {
                    resource_type: kind.as_str().to_string(),
                    attribute: def.name.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Representation of a stored record, with `groups` for users.
    async fn represent(&self, kind: ResourceKind, record: &StoreRecord) -> ScimResult<Resource> {
        let memberships = self.memberships(kind).await?;
        Ok(self.render(kind, record, &memberships))
    }

    fn render(&self, kind: ResourceKind, record: &StoreRecord, memberships: &Memberships) -> Resource {
        let mut resource = self.mapper(kind).to_representation(record);
        if let Some(groups) = record.id.as_deref().and_then(|id| memberships.get(id)) {
            resource.set_attribute("groups", Value::Array(groups.clone()));
        }
        resource
    }

    /// Direct group memberships, read from the groups' `members`.
    async fn memberships(&self, kind: ResourceKind) -> ScimResult<Memberships> {
        let mut memberships = Memberships::new();
        if kind != ResourceKind::User {
            return Ok(memberships);
        }

        let groups = self
            .storage
            .find_by_filter(ResourceKind::Group, &|record: &StoreRecord| {
                record.member_ids().next().is_some()
            })
            .await?;
        for group in &groups {
            let Some(group_id) = group.id.as_deref() else {
                continue;
            };
            let mut entry = Map::new();
            entry.insert("value".to_string(), Value::from(group_id));
            entry.insert(
                "$ref".to_string(),
                Value::from(self.mapper(ResourceKind::Group).location(group_id)),
            );
            if let Some(name) = group.field_str(fields::GROUP_NAME) {
                entry.insert("display".to_string(), Value::from(name));
            }
            entry.insert("type".to_string(), Value::from("direct"));

            let mut seen: Vec<&str> = Vec::new();
            for member in group.member_ids() {
                if seen.contains(&member) {
                    continue;
                }
                seen.push(member);
                memberships
                    .entry(member.to_string())
                    .or_default()
                    .push(Value::Object(entry.clone()));
            }
        }
        Ok(memberships)
    }
}

fn scoped_value<'r>(resource: &'r Resource, scope: AttributeScope<'_>, name: &str) -> Option<&'r Value> {
    match scope {
        AttributeScope::Core => resource.get_attribute(name),
        AttributeScope::Extension(urn) => resource
            .extension(urn)
            .and_then(|bucket| get_ignore_case(bucket, name)),
    }
}
