//! Competing writers against one resource.

use crate::common::fixtures::{patch, user_minimal};
use crate::common::{controller, create, etag_of, id_of};
use futures::future::join_all;
use scim_provider::ScimRequest;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_updates_with_same_etag_have_one_winner() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));
    let etag = etag_of(&created);

    let writers = (0..8).map(|i| {
        let request = ScimRequest::patch(
            &path,
            patch(json!([{ "op": "replace", "path": "title", "value": format!("Writer {}", i) }])),
        )
        .with_if_match(&etag);
        controller.handle(request)
    });
    let responses = join_all(writers).await;

    let winners: Vec<_> = responses.iter().filter(|r| r.status == 200).collect();
    let losers = responses.iter().filter(|r| r.status == 412).count();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers, 7);

    let fetched = controller.handle(ScimRequest::get(&path)).await;
    assert_eq!(fetched.body()["title"], winners[0].body()["title"]);
    assert_eq!(fetched.etag(), winners[0].etag());
}

#[tokio::test]
async fn test_spawned_writers_never_lose_updates_silently() {
    let controller = Arc::new(controller());
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));
    let etag = etag_of(&created);

    let mut handles = Vec::new();
    for i in 0..4 {
        let controller = Arc::clone(&controller);
        let path = path.clone();
        let etag = etag.clone();
        handles.push(tokio::spawn(async move {
            let request = ScimRequest::put(
                &path,
                json!({
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "bjensen",
                    "nickName": format!("Nick {}", i)
                }),
            )
            .with_if_match(&etag);
            controller.handle(request).await.status
        }));
    }

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.expect("writer task completes"));
    }
    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 1);
    assert!(statuses.iter().all(|s| *s == 200 || *s == 412));
}

#[tokio::test]
async fn test_unconditional_writers_all_apply() {
    let controller = controller();
    let created = create(&controller, "/Users", user_minimal("bjensen")).await;
    let path = format!("/Users/{}", id_of(&created));

    // Without If-Match each writer still reads then writes against the
    // version it read, so a lost race surfaces as 412 and never as a silent
    // overwrite.
    let writers = (0..4).map(|i| {
        controller.handle(ScimRequest::patch(
            &path,
            patch(json!([{ "op": "add", "path": "nickName", "value": format!("n{}", i) }])),
        ))
    });
    let responses = join_all(writers).await;
    assert!(responses.iter().any(|r| r.status == 200));
    assert!(responses.iter().all(|r| r.status == 200 || r.status == 412));
}

#[tokio::test]
async fn test_concurrent_creates_of_distinct_users() {
    let controller = controller();
    let creates = (0..10).map(|i| {
        controller.handle(ScimRequest::post("/Users", user_minimal(&format!("user{}", i))))
    });
    let responses = join_all(creates).await;
    assert!(responses.iter().all(|r| r.status == 201));

    let listed = controller.handle(ScimRequest::get("/Users")).await;
    assert_eq!(listed.body()["totalResults"], 10);
}
