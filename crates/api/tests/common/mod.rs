#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::TimeZone;
use http_body_util::BodyExt;
use tower::ServiceExt;

use article_api::config::ServerConfig;
use article_api::router::build_app_router;
use article_api::state::AppState;
use article_core::article::{Article, Author, Content, Copyright, License, Title};
use article_core::registry::StandardRegistry;
use article_core::search::SearchSettings;
use article_core::types::{ArticleId, Timestamp};
use article_store::{InMemoryContentStore, InMemorySearchIndex};

pub const ARTICLES: &str = "/article-api/v2/articles";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        search: SearchSettings::default(),
        article_url_base: "http://localhost:3000/article-api/v2/articles".to_string(),
        seed_path: None,
    }
}

/// Build the full application router over an in-memory store holding
/// `articles`, with the production middleware stack.
pub fn build_test_app(articles: Vec<Article>) -> Router {
    build_test_app_with_store(Arc::new(InMemoryContentStore::with_articles(articles)))
}

pub fn build_test_app_with_store(store: Arc<InMemoryContentStore>) -> Router {
    let config = test_config();
    let state = AppState {
        content: store.clone(),
        index: Arc::new(InMemorySearchIndex::new(store)),
        registry: Arc::new(StandardRegistry),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn ts(day: u32) -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 4, day, 8, 0, 0).unwrap()
}

/// An article with title and content in `language`.
pub fn article(id: ArticleId, language: &str, title: &str) -> Article {
    Article::new(
        id,
        Title {
            title: title.to_string(),
            language: language.to_string(),
        },
        Content {
            content: format!("<section><p>{title}</p></section>"),
            language: language.to_string(),
        },
        Copyright {
            license: License {
                license: "CC-BY-SA-4.0".into(),
                description: None,
                url: None,
            },
            origin: String::new(),
            creators: vec![Author {
                author_type: "writer".into(),
                name: "Kari Nordmann".into(),
            }],
            processors: vec![],
            rightsholders: vec![],
            agreement_id: None,
            valid_from: None,
            valid_to: None,
        },
        "standard",
        "editor",
        ts(1),
    )
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
