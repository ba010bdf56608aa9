//! Route definitions for the article contract.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{articles, search};
use crate::state::AppState;

/// Article routes mounted at `/article-api/v2/articles`.
///
/// ```text
/// GET    /                        -> search_get
/// POST   /search                  -> search_post
/// GET    /tag-search              -> tag_search
/// GET    /dump                    -> dump
/// PATCH  /partial-publish/{id}    -> partial_publish
/// GET    /{id}                    -> get_article
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search::search_get))
        .route("/search", post(search::search_post))
        .route("/tag-search", get(search::tag_search))
        .route("/dump", get(articles::dump))
        .route("/partial-publish/{id}", patch(articles::partial_publish))
        .route("/{id}", get(articles::get_article))
}
