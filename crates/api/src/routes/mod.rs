pub mod articles;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the article API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /article-api/v2/articles                          search (GET, query string)
/// /article-api/v2/articles/search                   search (POST, JSON body)
/// /article-api/v2/articles/tag-search               tag lookup
/// /article-api/v2/articles/dump                     bulk export
/// /article-api/v2/articles/partial-publish/{id}     partial publish (PATCH)
/// /article-api/v2/articles/{id}                     single article
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/article-api/v2/articles", articles::router())
}
