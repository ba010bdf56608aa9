//! Handlers for article search and tag lookup.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;

use article_core::search::{QueryNormalizer, SearchParams};
use article_core::summary::{assemble, paginate_tags, TagsSearchResult};
use article_core::validation::{ErrorClass, ValidationReport};

use crate::error::AppResult;
use crate::query::{language_or_all, page_window, query_or_default, SearchQuery, TagSearchQuery};
use crate::response::with_search_context;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// GET /article-api/v2/articles
///
/// Search with query-string parameters. List parameters are comma-separated.
pub async fn search_get(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Response> {
    let mut report = ValidationReport::new();
    let params = query_or_default(query, ErrorClass::MalformedQuery, &mut report)
        .into_params(&mut report);
    run_search(&state, &params, report).await
}

/// POST /article-api/v2/articles/search
///
/// Search with a JSON `SearchParams` body.
pub async fn search_post(
    State(state): State<AppState>,
    body: Result<Json<SearchParams>, JsonRejection>,
) -> AppResult<Response> {
    let mut report = ValidationReport::new();
    let params = match body {
        Ok(Json(params)) => params,
        Err(rejection) => {
            report.push(ErrorClass::MalformedQuery, "body", rejection.body_text());
            SearchParams::default()
        }
    };
    run_search(&state, &params, report).await
}

/// Normalize, query the index, load hits, and assemble the result page.
///
/// `report` may already hold violations found while parsing the request.
async fn run_search(
    state: &AppState,
    params: &SearchParams,
    mut report: ValidationReport,
) -> AppResult<Response> {
    let now = chrono::Utc::now();
    let normalizer = QueryNormalizer::new(&state.config.search, state.registry.as_ref());
    let plan = normalizer.normalize_into(params, now, &mut report);
    let plan = report.into_result(plan)?;

    let page = state.index.query(&plan, now).await?;
    let articles = state.content.load_many(&page.article_ids).await?;

    tracing::debug!(
        total_count = page.total_count,
        returned = articles.len(),
        language = %plan.criteria.language,
        scroll = plan.is_scroll(),
        "Search completed"
    );

    let result = assemble(
        &plan,
        page.total_count,
        &articles,
        &state.config.article_url_base,
        page.next_scroll_id,
    );
    let scroll_id = result.scroll_id.clone();
    Ok(with_search_context(result, scroll_id.as_deref()))
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// GET /article-api/v2/articles/tag-search
///
/// Distinct tags containing `query`, alphabetically, in `language` (`*` for
/// all languages).
pub async fn tag_search(
    State(state): State<AppState>,
    query: Result<Query<TagSearchQuery>, QueryRejection>,
) -> AppResult<Json<TagsSearchResult>> {
    let mut report = ValidationReport::new();
    let query = query_or_default(query, ErrorClass::MalformedQuery, &mut report);
    let (page, page_size) = page_window(
        query.page.as_deref(),
        query.page_size.as_deref(),
        &state.config.search,
        &mut report,
    );
    let language = language_or_all(query.language.as_deref(), &mut report);
    report.into_result(())?;

    let needle = query.query.as_deref().unwrap_or_default();
    let tags = state
        .index
        .search_tags(needle, &language, page, page_size)
        .await?;

    Ok(Json(paginate_tags(tags, page, page_size, &language)))
}
