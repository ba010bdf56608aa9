//! Response helpers for the article endpoints.
//!
//! Bodies are the contract shapes themselves (`SearchResult`, `ArticleV2`,
//! ...), not wrapped in an envelope.

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Header carrying the cursor for the next scroll page.
pub const SEARCH_CONTEXT_HEADER: HeaderName = HeaderName::from_static("search-context");

/// JSON response with an optional `search-context` header.
pub fn with_search_context<T: Serialize>(body: T, scroll_id: Option<&str>) -> Response {
    let mut response = Json(body).into_response();
    if let Some(value) = scroll_id.and_then(|id| HeaderValue::from_str(id).ok()) {
        response.headers_mut().insert(SEARCH_CONTEXT_HEADER, value);
    }
    response
}
