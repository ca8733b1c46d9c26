//! Routing failures and the shape of error bodies.

use crate::common::fixtures::user_minimal;
use crate::common::{BASE_URL, controller, create_user, scim_type};
use http::Method;
use scim_provider::ScimRequest;
use serde_json::json;

#[tokio::test]
async fn test_unknown_endpoint_is_not_found() {
    let controller = controller();
    for path in ["/Devices", "/Devices/1", "/Users/1/extra", "/"] {
        let response = controller.handle(ScimRequest::get(path)).await;
        assert_eq!(response.status, 404, "{}", path);
        assert_eq!(response.body()["status"], "404");
    }
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let cases = [
        ScimRequest::put("/Users", json!({})),
        ScimRequest::delete("/Groups"),
        ScimRequest::post(format!("/Users/{}", id), json!({})),
        ScimRequest::get("/Users/.search"),
        ScimRequest::new(Method::HEAD, "/ServiceProviderConfig"),
    ];
    for request in cases {
        let description = format!("{} {}", request.method, request.path);
        let response = controller.handle(request).await;
        assert_eq!(response.status, 405, "{}", description);
        assert_eq!(response.body()["status"], "405");
    }
}

#[tokio::test]
async fn test_full_paths_and_endpoint_case() {
    let controller = controller();
    let id = create_user(&controller, user_minimal("bjensen")).await;

    let prefixed = controller
        .handle(ScimRequest::get(format!("/scim/v2/Users/{}", id)))
        .await;
    assert_eq!(prefixed.status, 200);

    let lower = controller.handle(ScimRequest::get(format!("/users/{}", id))).await;
    assert_eq!(lower.status, 200);
    assert_eq!(
        lower.body()["meta"]["location"],
        format!("{}/Users/{}", BASE_URL, id)
    );
}

#[tokio::test]
async fn test_bodies_must_be_objects() {
    let controller = controller();

    let missing = controller
        .handle(ScimRequest::new(Method::POST, "/Users"))
        .await;
    assert_eq!(missing.status, 400);
    assert_eq!(scim_type(&missing), Some("invalidSyntax"));

    let array = controller
        .handle(ScimRequest::post("/Users", json!(["not", "an", "object"])))
        .await;
    assert_eq!(array.status, 400);
    assert_eq!(scim_type(&array), Some("invalidSyntax"));
}

#[tokio::test]
async fn test_missing_core_schema_is_invalid_value() {
    let controller = controller();
    let response = controller
        .handle(ScimRequest::post("/Users", json!({ "userName": "bjensen" })))
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(scim_type(&response), Some("invalidValue"));
}

#[tokio::test]
async fn test_unknown_attributes_are_rejected() {
    let controller = controller();
    let mut body = user_minimal("bjensen");
    body["shoeSize"] = json!(10);
    body["urn:example:unknown"] = json!({ "a": 1 });

    let response = controller.handle(ScimRequest::post("/Users", body)).await;
    assert_eq!(response.status, 400);
    let detail = response.body()["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("shoeSize"), "{}", detail);
    assert!(detail.contains("urn:example:unknown"), "{}", detail);
}

#[tokio::test]
async fn test_request_id_header_is_accepted() {
    let controller = controller();
    let response = controller
        .handle(ScimRequest::get("/ServiceProviderConfig").with_header("X-Request-Id", "req-123"))
        .await;
    assert!(response.is_success());
}
