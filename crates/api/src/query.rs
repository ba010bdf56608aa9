//! Query-string parameter types for the article endpoints.
//!
//! Every value arrives as a string so that a malformed number or boolean is
//! reported through the same `ValidationError` envelope as any other
//! violation, instead of being rejected by the extractor.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};

use article_core::language::{is_valid_language_tag, ALL_LANGUAGES};
use article_core::registry::{self, Entity};
use article_core::search::{clamp_limit, SearchParams, SearchSettings};
use article_core::validation::{ErrorClass, ValidationReport};
use serde::Deserialize;

/// `GET /article-api/v2/articles` parameters. Lists are comma-separated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub ids: Option<String>,
    pub article_types: Option<String>,
    pub sort: Option<String>,
    pub fallback: Option<String>,
    pub scroll_id: Option<String>,
    pub grep_codes: Option<String>,
}

impl SearchQuery {
    /// Convert to [`SearchParams`], recording unparseable values in `report`.
    pub fn into_params(self, report: &mut ValidationReport) -> SearchParams {
        let id_list = split_list(self.ids.as_deref())
            .filter_map(|raw| parse_integer("ids", raw, report))
            .collect();

        SearchParams {
            query: self.query,
            language: self.language,
            license: self.license,
            page: self
                .page
                .as_deref()
                .and_then(|raw| parse_integer("page", raw, report)),
            page_size: self
                .page_size
                .as_deref()
                .and_then(|raw| parse_integer("pageSize", raw, report)),
            id_list,
            article_types: split_list(self.article_types.as_deref())
                .map(String::from)
                .collect(),
            sort: self.sort,
            fallback: self
                .fallback
                .as_deref()
                .and_then(|raw| parse_bool("fallback", raw, report)),
            scroll_id: self.scroll_id,
            grep_codes: split_list(self.grep_codes.as_deref())
                .map(String::from)
                .collect(),
        }
    }
}

/// `GET /article-api/v2/articles/{id}` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleQuery {
    pub language: Option<String>,
    pub fallback: Option<String>,
}

/// `GET /tag-search` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSearchQuery {
    pub query: Option<String>,
    pub language: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// `GET /dump` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpQuery {
    pub language: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Validated page number and clamped page size for plain paged listings.
pub fn page_window(
    page: Option<&str>,
    page_size: Option<&str>,
    settings: &SearchSettings,
    report: &mut ValidationReport,
) -> (u64, u64) {
    let page = page.and_then(|raw| parse_integer("page", raw, report));
    let page_size = page_size.and_then(|raw| parse_integer("pageSize", raw, report));

    for (name, value) in [("page", page), ("pageSize", page_size)] {
        let violation = value.and_then(|v| {
            registry::field(Entity::SearchParams, name).and_then(|def| def.check_number(v))
        });
        if let Some(msg) = violation {
            report.push(ErrorClass::MalformedQuery, name, msg);
        }
    }

    let page = page.unwrap_or(1).max(1) as u64;
    let page_size = clamp_limit(page_size, settings.default_page_size, settings.max_page_size);
    (page, page_size)
}

/// A language tag or `*`; absent means `*`.
pub fn language_or_all(language: Option<&str>, report: &mut ValidationReport) -> String {
    match language.map(str::trim) {
        None | Some("") | Some(ALL_LANGUAGES) => ALL_LANGUAGES.to_string(),
        Some(lang) => {
            if !is_valid_language_tag(lang) {
                report.push(
                    ErrorClass::MalformedQuery,
                    "language",
                    format!("'{lang}' is not a valid language tag"),
                );
            }
            lang.to_string()
        }
    }
}

pub fn parse_bool(field: &str, raw: &str, report: &mut ValidationReport) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            report.push(
                ErrorClass::MalformedQuery,
                field,
                format!("'{other}' is not a boolean"),
            );
            None
        }
    }
}

/// Unwrap an extracted query string. A rejection is recorded under `query`
/// and the defaults are used so the remaining checks still run.
pub fn query_or_default<T: Default>(
    extracted: Result<Query<T>, QueryRejection>,
    class: ErrorClass,
    report: &mut ValidationReport,
) -> T {
    match extracted {
        Ok(Query(query)) => query,
        Err(rejection) => {
            report.push(class, "query", rejection.body_text());
            T::default()
        }
    }
}

/// Unwrap an extracted path parameter, recording a rejection under `field`.
pub fn path_or_default<T: Default>(
    extracted: Result<Path<T>, PathRejection>,
    class: ErrorClass,
    field: &str,
    report: &mut ValidationReport,
) -> T {
    match extracted {
        Ok(Path(value)) => value,
        Err(rejection) => {
            report.push(class, field, rejection.body_text());
            T::default()
        }
    }
}

fn parse_integer(field: &str, raw: &str, report: &mut ValidationReport) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            report.push(
                ErrorClass::MalformedQuery,
                field,
                format!("'{}' is not an integer", raw.trim()),
            );
            None
        }
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
