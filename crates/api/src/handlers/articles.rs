//! Handlers for single-article reads, partial publishing, and bulk export.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use article_core::article::Article;
use article_core::error::CoreError;
use article_core::publish::{publish_partial, PartialPublishPatch};
use article_core::summary::{assemble_dump, project_article, ArticleDump, ArticleV2};
use article_core::types::ArticleId;
use article_core::validation::{ErrorClass, ValidationReport};

use crate::error::{AppError, AppResult};
use crate::query::{
    language_or_all, page_window, parse_bool, path_or_default, query_or_default, ArticleQuery,
    DumpQuery,
};
use crate::state::AppState;

/// GET /article-api/v2/articles/{id}
///
/// The article projected into `language` (default: its first language).
/// With `fallback=true` a missing language falls back instead of 404.
pub async fn get_article(
    State(state): State<AppState>,
    id: Result<Path<ArticleId>, PathRejection>,
    query: Result<Query<ArticleQuery>, QueryRejection>,
) -> AppResult<Json<ArticleV2>> {
    let mut report = ValidationReport::new();
    let id = path_or_default(id, ErrorClass::MalformedQuery, "id", &mut report);
    let query = query_or_default(query, ErrorClass::MalformedQuery, &mut report);
    let language = language_or_all(query.language.as_deref(), &mut report);
    let fallback = query
        .fallback
        .as_deref()
        .and_then(|raw| parse_bool("fallback", raw, &mut report))
        .unwrap_or(false);
    report.into_result(())?;

    let article = state.content.load(id).await?;
    let projected = project_article(&article, &language, fallback).ok_or_else(|| {
        tracing::debug!(article_id = id, %language, "Article has no content in language");
        AppError::Core(CoreError::NotFound {
            entity: "Article",
            id,
        })
    })?;

    Ok(Json(projected))
}

/// PATCH /article-api/v2/articles/partial-publish/{id}
///
/// Merge a sparse patch into the stored article and return the full
/// article as stored.
pub async fn partial_publish(
    State(state): State<AppState>,
    id: Result<Path<ArticleId>, PathRejection>,
    body: Result<Json<PartialPublishPatch>, JsonRejection>,
) -> AppResult<Json<Article>> {
    let mut report = ValidationReport::new();
    let id = path_or_default(id, ErrorClass::InvalidPatch, "id", &mut report);
    let patch = match body {
        Ok(Json(patch)) => patch,
        Err(rejection) => {
            report.push(ErrorClass::InvalidPatch, "body", rejection.body_text());
            PartialPublishPatch::default()
        }
    };
    let patch = report.into_result(patch)?;

    let article =
        publish_partial(state.content.as_ref(), state.registry.as_ref(), id, &patch).await?;

    tracing::info!(article_id = id, revision = article.revision, "Article partially published");

    Ok(Json(article))
}

/// GET /article-api/v2/articles/dump
///
/// Page through every article in id order, projected into `language`.
pub async fn dump(
    State(state): State<AppState>,
    query: Result<Query<DumpQuery>, QueryRejection>,
) -> AppResult<Json<ArticleDump>> {
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

    let hits = state
        .index
        .dump(Some(language.as_str()), page, page_size)
        .await?;
    let articles = state.content.load_many(&hits.article_ids).await?;

    Ok(Json(assemble_dump(
        hits.total_count,
        page,
        page_size,
        &language,
        &articles,
    )))
}
