//! PATCH over the HTTP-shaped surface (RFC 7644 §3.5.2).

use crate::common::fixtures::{ENTERPRISE_SCHEMA, group, patch, user_minimal, user_with_emails};
use crate::common::{controller, create, create_group, create_user, etag_of, id_of, scim_type};
use scim_provider::storage::InMemoryStorage;
use scim_provider::{ScimController, ScimRequest, ScimResponse};
use serde_json::{Value, json};

async fn apply(
    controller: &ScimController<InMemoryStorage>,
    path: &str,
    operations: Value,
) -> ScimResponse {
    controller
        .handle(ScimRequest::patch(path, patch(operations)))
        .await
}

#[tokio::test]
async fn test_filtered_replace_touches_only_matching_elements() {
    let controller = controller();
    let id = create_user(&controller, user_with_emails("bjensen")).await;
    let path = format!("/Users/{}", id);

    let response = apply(
        &controller,
        &path,
        json!([{ "op": "replace", "path": "emails[type eq \"work\"].value", "value": "c@example.com" }]),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body()["emails"],
        json!([
            { "value": "c@example.com", "type": "work", "primary": true },
            { "value": "b@example.com", "type": "home" }
        ])
    );
}

#[tokio::test]
async fn test_add_then_remove_restores_attribute() {
    let controller = controller();
    let created = create(&controller, "/Users", user_with_emails("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let response = apply(
        &controller,
        &path,
        json!([
            { "op": "add", "path": "nickName", "value": "Babs" },
            { "op": "remove", "path": "nickName" }
        ]),
    )
    .await;

    assert_eq!(response.status, 200);
    assert!(response.body().get("nickName").is_none());
    // nothing changed, so nothing was written
    assert_eq!(response.etag(), created.etag());
    assert_eq!(response.body(), created.body());
}

#[tokio::test]
async fn test_replace_username_is_not_modifiable() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let response = apply(
        &controller,
        &path,
        json!([{ "op": "replace", "path": "userName", "value": "barbara" }]),
    )
    .await;
    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("mutability"));

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert_eq!(fetched.body()["userName"], "bjensen");
    assert_eq!(fetched.etag(), created.etag());
}

#[tokio::test]
async fn test_failed_operation_rolls_back_whole_request() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let response = apply(
        &controller,
        &path,
        json!([
            { "op": "add", "path": "title", "value": "Tour Guide" },
            { "op": "replace", "path": "shoeSize", "value": 10 }
        ]),
    )
    .await;
    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("invalidPath"));

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert!(fetched.body().get("title").is_none());
}

#[tokio::test]
async fn test_pathless_add_merges_and_quirks_are_accepted() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id);

    let response = apply(
        &controller,
        &path,
        json!([
            { "op": "Add", "value": { "title": "Tour Guide", "name": { "givenName": "Barbara" } } },
            { "op": "Replace", "path": "active", "value": "False" }
        ]),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body());
    assert_eq!(response.body()["title"], "Tour Guide");
    assert_eq!(response.body()["name"]["givenName"], "Barbara");
    assert_eq!(response.body()["active"], false);
}

#[tokio::test]
async fn test_add_with_value_filter_creates_missing_element() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id);

    let response = apply(
        &controller,
        &path,
        json!([{ "op": "add", "path": "emails[type eq \"work\"].value", "value": "bjensen@example.com" }]),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body());
    assert_eq!(
        response.body()["emails"],
        json!([{ "type": "work", "value": "bjensen@example.com" }])
    );
}

#[tokio::test]
async fn test_remove_without_match_is_noop() {
    let controller = controller();
    let created = create(&controller, "/Users", user_with_emails("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let response = apply(
        &controller,
        &path,
        json!([{ "op": "remove", "path": "emails[type eq \"other\"]" }]),
    )
    .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.etag(), created.etag());
}

#[tokio::test]
async fn test_remove_requires_path() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let response = apply(
        &controller,
        &format!("/Users/{}", id),
        json!([{ "op": "remove" }]),
    )
    .await;
    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("noTarget"));
}

#[tokio::test]
async fn test_patch_extension_attribute() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let response = apply(
        &controller,
        &format!("/Users/{}", id),
        json!([{
            "op": "add",
            "path": format!("{}:department", ENTERPRISE_SCHEMA),
            "value": "Tour Operations"
        }]),
    )
    .await;

    assert_eq!(response.status, 200, "{}", response.body());
    assert_eq!(response.body()[ENTERPRISE_SCHEMA]["department"], "Tour Operations");
    assert!(
        response.body()["schemas"]
            .as_array()
            .is_some_and(|schemas| schemas.contains(&json!(ENTERPRISE_SCHEMA)))
    );
}

#[tokio::test]
async fn test_group_membership_add_and_remove() {
    let controller = controller();
    let alice = create_user(&controller, user_minimal("alice")).await;
    let bob = create_user(&controller, user_minimal("bob")).await;
    let group_id = create_group(&controller, group("Tour Guides", &[&alice])).await;
    let path = format!("/Groups/{}", group_id);

    let added = apply(
        &controller,
        &path,
        json!([{ "op": "add", "path": "members", "value": [{ "value": bob }] }]),
    )
    .await;
    assert_eq!(added.status, 200);
    assert_eq!(added.body()["members"].as_array().map(Vec::len), Some(2));

    let removed = apply(
        &controller,
        &path,
        json!([{ "op": "remove", "path": format!("members[value eq \"{}\"]", alice) }]),
    )
    .await;
    assert_eq!(removed.status, 200);
    assert_eq!(removed.body()["members"], json!([{ "value": bob }]));

    let alice_user = controller.handle(ScimRequest::get(format!("/Users/{}", alice))).await;
    assert!(alice_user.body().get("groups").is_none());
    let bob_user = controller.handle(ScimRequest::get(format!("/Users/{}", bob))).await;
    assert_eq!(bob_user.body()["groups"][0]["value"], group_id);
}

#[tokio::test]
async fn test_patch_with_stale_etag_fails() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));
    let first = etag_of(&created);
    let body = patch(json!([{ "op": "replace", "path": "title", "value": "Guide" }]));

    let ok = controller
        .handle(ScimRequest::patch(&path, body.clone()).with_if_match(&first))
        .await;
    assert_eq!(ok.status, 200);
    assert_ne!(ok.etag(), Some(first.as_str()));

    let stale = controller
        .handle(ScimRequest::patch(&path, body).with_if_match(&first))
        .await;
    assert_eq!(stale.status, 412);
}

#[tokio::test]
async fn test_malformed_patch_bodies() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id);

    let no_schema = controller
        .handle(ScimRequest::patch(
            &path,
            json!({ "Operations": [{ "op": "add", "path": "title", "value": "x" }] }),
        ))
        .await;
    assert_eq!(no_schema.status, 400);

    let bad_op = apply(&controller, &path, json!([{ "op": "move", "path": "title" }])).await;
    assert_eq!(bad_op.status, 400);

    let no_body = controller
        .handle(ScimRequest::new(http::Method::PATCH, path.as_str()))
        .await;
    assert_eq!(no_body.status, 400);
}
