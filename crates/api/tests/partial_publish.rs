mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use article_core::store::ContentStore;
use article_store::InMemoryContentStore;
use common::ARTICLES;

fn stored_at_revision(revision: i32) -> Arc<InMemoryContentStore> {
    let mut article = common::article(42, "nb", "Klima");
    article.revision = revision;
    Arc::new(InMemoryContentStore::with_articles(vec![article]))
}

#[tokio::test]
async fn patch_merges_and_bumps_revision() {
    let store = stored_at_revision(3);
    let app = common::build_test_app_with_store(store.clone());

    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/42"),
        json!({
            "availability": "teacher",
            "license": "CC-BY-4.0",
            "tags": [{ "tags": [" klima ", "vær"], "language": "nb" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["revision"], 4);
    assert_eq!(json["availability"], "teacher");
    assert_eq!(json["copyright"]["license"]["license"], "CC-BY-4.0");
    assert_eq!(json["tags"], json!([{ "tags": ["klima", "vær"], "language": "nb" }]));

    let stored = store.load(42).await.unwrap();
    assert_eq!(stored.revision, 4);
    assert_eq!(stored.copyright.license.license, "CC-BY-4.0");
}

#[tokio::test]
async fn patch_for_missing_language_leaves_article_untouched() {
    let store = stored_at_revision(3);
    let app = common::build_test_app_with_store(store.clone());

    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/42"),
        json!({ "metaDescription": [{ "metaDescription": "Klimaet endrer seg", "language": "en" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["code"], "LANGUAGE_MISMATCH");
    assert_eq!(json["messages"][0]["field"], "metaDescription");

    let stored = store.load(42).await.unwrap();
    assert_eq!(stored.revision, 3);
    assert!(stored.meta_description.is_empty());
}

#[tokio::test]
async fn unknown_license_is_rejected() {
    let app = common::build_test_app_with_store(stored_at_revision(1));
    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/42"),
        json!({ "license": "NOT-A-LICENSE" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "UNKNOWN_LICENSE");
}

#[tokio::test]
async fn patch_for_unknown_article_is_404() {
    let app = common::build_test_app_with_store(stored_at_revision(1));
    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/7"),
        json!({ "availability": "student" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_patch_returns_article_unchanged() {
    let store = stored_at_revision(5);
    let app = common::build_test_app_with_store(store.clone());
    let response =
        common::patch_json(app, &format!("{ARTICLES}/partial-publish/42"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["revision"], 5);
    assert_eq!(store.load(42).await.unwrap().revision, 5);
}

#[tokio::test]
async fn malformed_body_is_an_invalid_patch() {
    let app = common::build_test_app_with_store(stored_at_revision(1));
    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/42"),
        json!({ "tags": "not-a-list" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "INVALID_PATCH");
    assert_eq!(json["messages"][0]["field"], "body");
}

#[tokio::test]
async fn non_numeric_id_is_an_invalid_patch() {
    let app = common::build_test_app_with_store(stored_at_revision(1));
    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/abc"),
        json!({ "availability": "student" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "INVALID_PATCH");
    assert_eq!(json["messages"][0]["field"], "id");
}

#[tokio::test]
async fn revision_at_upper_bound_is_an_internal_error() {
    let store = stored_at_revision(i32::MAX);
    let app = common::build_test_app_with_store(store.clone());
    let response = common::patch_json(
        app,
        &format!("{ARTICLES}/partial-publish/42"),
        json!({ "availability": "student" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(store.load(42).await.unwrap().revision, i32::MAX);
}
