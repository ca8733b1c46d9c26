//! Resource lifecycle over the HTTP-shaped surface.

use crate::common::fixtures::{ENTERPRISE_SCHEMA, enterprise_user, group, user_minimal, user_with_emails};
use crate::common::{
    BASE_URL, FailingStorage, controller, controller_with, create, create_group, create_user,
    etag_of, id_of, init_logging, resources, scim_type,
};
use scim_provider::{ScimControllerBuilder, ScimRequest};
use serde_json::json;

#[tokio::test]
async fn test_create_returns_location_and_etag() {
    let controller = controller();
    let response = create(&controller, "/Users", user_with_emails("bjensen")).await;

    let body = response.body();
    let id = id_of(&response);
    let location = format!("{}/Users/{}", BASE_URL, id);
    assert_eq!(response.location(), Some(location.as_str()));
    assert_eq!(body["meta"]["location"], location);
    assert_eq!(body["meta"]["resourceType"], "User");
    assert_eq!(body["meta"]["version"], etag_of(&response));
    assert!(body["meta"]["created"].is_string());
    assert_eq!(body["schemas"], json!(["urn:ietf:params:scim:schemas:core:2.0:User"]));
    assert_eq!(body["name"]["givenName"], "Barbara");
    assert_eq!(body["emails"][0]["value"], "a@example.com");
    assert_eq!(
        response.headers["content-type"],
        scim_provider::controller::SCIM_CONTENT_TYPE
    );
}

#[tokio::test]
async fn test_get_matches_create() {
    let controller = controller();
    let created = create(&controller, "/Users", user_with_emails("bjensen")).await;
    let id = id_of(&created);

    let fetched = controller.handle(ScimRequest::get(format!("/Users/{}", id))).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body(), created.body());
    assert_eq!(fetched.etag(), created.etag());
    assert!(fetched.location().is_none());
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let controller = controller();
    let response = controller.handle(ScimRequest::get("/Users/does-not-exist")).await;

    assert_eq!(response.status, 404);
    assert_eq!(
        response.body()["schemas"],
        json!(["urn:ietf:params:scim:api:messages:2.0:Error"])
    );
    assert_eq!(response.body()["status"], "404");
    assert!(response.body()["detail"].as_str().is_some_and(|d| d.contains("does-not-exist")));
}

#[tokio::test]
async fn test_password_is_never_returned() {
    let controller = controller();
    let created = create(&controller, "/Users", enterprise_user("bjensen", "Tour Operations")).await;
    assert!(created.body().get("password").is_none());

    let fetched = controller
        .handle(ScimRequest::get(format!("/Users/{}", id_of(&created))))
        .await;
    assert!(fetched.body().get("password").is_none());
}

#[tokio::test]
async fn test_enterprise_extension_round_trip() {
    let controller = controller();
    let created = create(&controller, "/Users", enterprise_user("bjensen", "Tour Operations")).await;

    let body = created.body();
    assert!(
        body["schemas"]
            .as_array()
            .is_some_and(|schemas| schemas.contains(&json!(ENTERPRISE_SCHEMA)))
    );
    assert_eq!(body[ENTERPRISE_SCHEMA]["department"], "Tour Operations");
    assert_eq!(body[ENTERPRISE_SCHEMA]["employeeNumber"], "701984");
    assert_eq!(body["externalId"], "ext-bjensen");
}

#[tokio::test]
async fn test_put_replaces_and_bumps_version() {
    let controller = controller();
    let created = create(&controller, "/Users", user_with_emails("bjensen")).await;
    let id = id_of(&created);

    let replaced = controller
        .handle(ScimRequest::put(
            format!("/Users/{}", id),
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "userName": "bjensen",
                "title": "Tour Guide"
            }),
        ))
        .await;

    assert_eq!(replaced.status, 200);
    assert_eq!(replaced.body()["title"], "Tour Guide");
    // readWrite attributes left out of a PUT are cleared
    assert!(replaced.body().get("name").is_none());
    assert!(replaced.body().get("emails").is_none());
    assert_ne!(replaced.etag(), created.etag());
    assert_eq!(replaced.body()["meta"]["created"], created.body()["meta"]["created"]);
}

#[tokio::test]
async fn test_put_cannot_change_immutable_username() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let response = controller
        .handle(ScimRequest::put(format!("/Users/{}", id), user_minimal("barbara")))
        .await;
    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("mutability"));

    let fetched = controller.handle(ScimRequest::get(format!("/Users/{}", id))).await;
    assert_eq!(fetched.body()["userName"], "bjensen");
}

#[tokio::test]
async fn test_put_without_username_keeps_it() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let replaced = controller
        .handle(ScimRequest::put(
            &path,
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "displayName": "Babs"
            }),
        ))
        .await;
    assert_eq!(replaced.status, 200, "{}", replaced.body());
    assert_eq!(replaced.body()["userName"], "bjensen");
    assert_eq!(replaced.body()["displayName"], "Babs");

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert_eq!(fetched.body()["userName"], "bjensen");
    assert_eq!(fetched.etag(), replaced.etag());
}

#[tokio::test]
async fn test_create_rejects_read_only_attributes() {
    let controller = controller();
    let mut body = user_minimal("bjensen");
    body["groups"] = json!([{ "value": "some-group" }]);

    let response = controller.handle(ScimRequest::post("/Users", body)).await;
    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("mutability"));
}

#[tokio::test]
async fn test_validation_reports_every_violation() {
    let controller = controller();
    let response = controller
        .handle(ScimRequest::post(
            "/Users",
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "active": "yes",
                "emails": { "value": "a@example.com" }
            }),
        ))
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("invalidValue"));
    let detail = response.body()["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("userName"), "{}", detail);
    assert!(detail.contains("active"), "{}", detail);
    assert!(detail.contains("emails"), "{}", detail);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let controller = controller();
    create_user(&controller, user_minimal("bjensen")).await;

    let duplicate = controller
        .handle(ScimRequest::post("/Users", user_minimal("BJENSEN")))
        .await;
    assert_eq!(duplicate.status, 409);
    assert_eq!(scim_type(&duplicate), Some("uniqueness"));

    let listed = controller.handle(ScimRequest::get("/Users")).await;
    assert_eq!(listed.body()["totalResults"], 1);
}

#[tokio::test]
async fn test_update_does_not_conflict_with_itself() {
    let controller = controller_with(|builder| builder.with_email_as_username(true));
    create_user(&controller, user_minimal("a@example.com")).await;
    let id = create_user(&controller, user_minimal("b@example.com")).await;

    let same = controller
        .handle(ScimRequest::put(format!("/Users/{}", id), user_minimal("b@example.com")))
        .await;
    assert_eq!(same.status, 200);
    assert_eq!(same.body()["userName"], "b@example.com");
    assert_eq!(controller.storage().stats().await.users, 2);
}

#[tokio::test]
async fn test_delete_then_get_and_delete_again() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id);

    let deleted = controller.handle(ScimRequest::delete(&path)).await;
    assert_eq!(deleted.status, 204);
    assert!(deleted.body.is_none());

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert_eq!(fetched.status, 404);

    let again = controller.handle(ScimRequest::delete(&path)).await;
    assert_eq!(again.status, 404);
}

#[tokio::test]
async fn test_if_match_on_put() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));
    let first = etag_of(&created);

    let updated = controller
        .handle(
            ScimRequest::put(&path, json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "userName": "bjensen",
                "nickName": "Babs"
            }))
            .with_if_match(&first),
        )
        .await;
    assert_eq!(updated.status, 200);

    let stale = controller
        .handle(ScimRequest::put(&path, user_minimal("bjensen")).with_if_match(&first))
        .await;
    assert_eq!(stale.status, 412);
    assert_eq!(stale.body()["status"], "412");

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert_eq!(fetched.body()["nickName"], "Babs");

    let any = controller
        .handle(ScimRequest::put(&path, user_minimal("bjensen")).with_if_match("*"))
        .await;
    assert_eq!(any.status, 200);
}

#[tokio::test]
async fn test_if_match_on_delete() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let stale = controller
        .handle(ScimRequest::delete(&path).with_if_match("W/\"not-the-version\""))
        .await;
    assert_eq!(stale.status, 412);

    let current = controller
        .handle(ScimRequest::delete(&path).with_if_match(&etag_of(&created)))
        .await;
    assert_eq!(current.status, 204);
}

#[tokio::test]
async fn test_required_if_match() {
    let controller = controller_with(|builder| builder.with_require_if_match(true));
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    let missing = controller.handle(ScimRequest::delete(&path)).await;
    assert_eq!(missing.status, 412);

    let present = controller
        .handle(ScimRequest::delete(&path).with_if_match(&etag_of(&created)))
        .await;
    assert_eq!(present.status, 204);
}

#[tokio::test]
async fn test_malformed_if_match_is_bad_request() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let response = controller
        .handle(ScimRequest::delete(format!("/Users/{}", id)).with_if_match("not an etag"))
        .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_user_groups_follow_membership() {
    let controller = controller();
    let user_id = create_user(&controller, user_minimal("bjensen")).await;
    let group_id = create_group(&controller, group("Tour Guides", &[&user_id])).await;

    let user = controller.handle(ScimRequest::get(format!("/Users/{}", user_id))).await;
    assert_eq!(
        user.body()["groups"],
        json!([{
            "value": group_id,
            "$ref": format!("{}/Groups/{}", BASE_URL, group_id),
            "display": "Tour Guides",
            "type": "direct"
        }])
    );

    let deleted = controller
        .handle(ScimRequest::delete(format!("/Groups/{}", group_id)))
        .await;
    assert_eq!(deleted.status, 204);

    let user = controller.handle(ScimRequest::get(format!("/Users/{}", user_id))).await;
    assert!(user.body().get("groups").is_none());
}

#[tokio::test]
async fn test_groups_filter_by_member() {
    let controller = controller();
    let user_id = create_user(&controller, user_minimal("bjensen")).await;
    create_group(&controller, group("Tour Guides", &[&user_id])).await;
    create_group(&controller, group("Empty", &[])).await;

    let filter = format!("members.value eq \"{}\"", user_id);
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("filter", &filter)
        .finish();
    let response = controller
        .handle(ScimRequest::get(format!("/Groups?{}", query)))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body()["totalResults"], 1);
    assert_eq!(resources(&response)[0]["displayName"], "Tour Guides");
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    init_logging();
    let controller = ScimControllerBuilder::new(FailingStorage).build().expect("builds");

    let response = controller.handle(ScimRequest::get("/Users/42")).await;
    assert_eq!(response.status, 500);
    assert_eq!(response.body()["status"], "500");
    assert!(
        response.body()["detail"]
            .as_str()
            .is_some_and(|detail| detail.contains("unreachable"))
    );

    let response = controller
        .handle(ScimRequest::post("/Users", user_minimal("bjensen")))
        .await;
    assert_eq!(response.status, 500);
}
