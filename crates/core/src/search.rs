//! Query normalizer: turns an untrusted search request into a canonical,
//! bounded [`QueryPlan`].
//!
//! Every check runs, so one response reports every violation. Page-based
//! and scroll-based addressing are mutually exclusive; a `scrollId` always
//! wins over `page`.

use serde::{Deserialize, Serialize};

use crate::language::{is_valid_language_tag, ALL_LANGUAGES};
use crate::registry::{self, ContentRegistry, Entity, ALL_LICENSES};
use crate::scroll::{self, is_initial_scroll, ScrollCursor};
use crate::types::{ArticleId, Timestamp};
use crate::validation::{ErrorClass, ValidationError, ValidationReport};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of search results per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum number of search results per page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default lifetime of a scroll cursor, in seconds.
pub const DEFAULT_SCROLL_TTL_SECS: i64 = 60;

/// Language used when fallback is requested without a language.
pub const DEFAULT_LANGUAGE: &str = "nb";

/// Clamp a user-provided page size to `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: u64, max: u64) -> u64 {
    let limit = limit.unwrap_or(default as i64).max(1) as u64;
    limit.min(max)
}

// ---------------------------------------------------------------------------
// Request and plan types
// ---------------------------------------------------------------------------

/// Raw search request. All fields are untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub id_list: Vec<ArticleId>,
    #[serde(default)]
    pub article_types: Vec<String>,
    pub sort: Option<String>,
    pub fallback: Option<bool>,
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub grep_codes: Vec<String>,
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    #[serde(rename = "relevance")]
    RelevanceAsc,
    /// Most relevant first; ties broken by most recently updated.
    #[default]
    #[serde(rename = "-relevance")]
    RelevanceDesc,
    #[serde(rename = "title")]
    TitleAsc,
    #[serde(rename = "-title")]
    TitleDesc,
    #[serde(rename = "lastUpdated")]
    LastUpdatedAsc,
    #[serde(rename = "-lastUpdated")]
    LastUpdatedDesc,
    #[serde(rename = "id")]
    IdAsc,
    #[serde(rename = "-id")]
    IdDesc,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RelevanceAsc => "relevance",
            Self::RelevanceDesc => "-relevance",
            Self::TitleAsc => "title",
            Self::TitleDesc => "-title",
            Self::LastUpdatedAsc => "lastUpdated",
            Self::LastUpdatedDesc => "-lastUpdated",
            Self::IdAsc => "id",
            Self::IdDesc => "-id",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "relevance" => Some(Self::RelevanceAsc),
            "-relevance" => Some(Self::RelevanceDesc),
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            "lastUpdated" => Some(Self::LastUpdatedAsc),
            "-lastUpdated" => Some(Self::LastUpdatedDesc),
            "id" => Some(Self::IdAsc),
            "-id" => Some(Self::IdDesc),
            _ => None,
        }
    }

    pub fn is_descending(self) -> bool {
        self.as_str().starts_with('-')
    }
}

/// The canonical query: everything that selects and orders results.
///
/// This is what a scroll cursor carries and what its fingerprint covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCriteria {
    pub query: Option<String>,
    /// A language tag, or [`ALL_LANGUAGES`].
    pub language: String,
    pub fallback: bool,
    pub license: Option<String>,
    pub id_list: Vec<ArticleId>,
    pub article_types: Vec<String>,
    pub grep_codes: Vec<String>,
    pub sort: Sort,
    pub page_size: u64,
}

impl QueryCriteria {
    pub fn is_all_languages(&self) -> bool {
        self.language == ALL_LANGUAGES
    }
}

/// How the requested slice of results is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Pagination {
    Page { page: u64 },
    Scroll { offset: u64 },
}

/// Normalized, bounded query ready for the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPlan {
    pub criteria: QueryCriteria,
    pub pagination: Pagination,
}

impl QueryPlan {
    pub fn page_size(&self) -> u64 {
        self.criteria.page_size
    }

    /// Page number, absent for scroll-addressed plans.
    pub fn page(&self) -> Option<u64> {
        match self.pagination {
            Pagination::Page { page } => Some(page),
            Pagination::Scroll { .. } => None,
        }
    }

    /// Index of the first hit to return.
    pub fn offset(&self) -> u64 {
        match self.pagination {
            Pagination::Page { page } => (page - 1).saturating_mul(self.page_size()),
            Pagination::Scroll { offset } => offset,
        }
    }

    pub fn is_scroll(&self) -> bool {
        matches!(self.pagination, Pagination::Scroll { .. })
    }

    pub fn fingerprint(&self) -> String {
        scroll::fingerprint(&self.criteria)
    }

    /// Cursor for the page after this one, for scroll-addressed plans with
    /// hits remaining.
    pub fn next_scroll_id(&self, total_count: u64, issued_at: Timestamp) -> Option<String> {
        if !self.is_scroll() {
            return None;
        }
        let next = self.offset() + self.page_size();
        if next >= total_count {
            return None;
        }
        Some(ScrollCursor::new(self.criteria.clone(), next, issued_at).encode())
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Tunables for query normalization.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub scroll_ttl: chrono::Duration,
    pub default_language: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            scroll_ttl: chrono::Duration::seconds(DEFAULT_SCROLL_TTL_SECS),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Validates and normalizes [`SearchParams`].
pub struct QueryNormalizer<'a> {
    settings: &'a SearchSettings,
    registry: &'a dyn ContentRegistry,
}

impl<'a> QueryNormalizer<'a> {
    pub fn new(settings: &'a SearchSettings, registry: &'a dyn ContentRegistry) -> Self {
        Self { settings, registry }
    }

    /// Normalize `params`, or report every violation.
    pub fn normalize(
        &self,
        params: &SearchParams,
        now: Timestamp,
    ) -> Result<QueryPlan, ValidationError> {
        let mut report = ValidationReport::new();
        let plan = self.normalize_into(params, now, &mut report);
        report.into_result(plan)
    }

    /// Normalize `params`, recording violations in `report`.
    ///
    /// Always returns a plan; it is only meaningful when `report` stays
    /// empty. Callers with their own earlier checks (e.g. query-string
    /// parsing) pass a report that already holds those violations.
    pub fn normalize_into(
        &self,
        params: &SearchParams,
        now: Timestamp,
        report: &mut ValidationReport,
    ) -> QueryPlan {
        let requested = self.criteria_from(params, report);

        let Some(scroll_id) = params.scroll_id.as_deref().map(str::trim) else {
            let page = self.resolve_page(params.page, report);
            return QueryPlan {
                criteria: requested,
                pagination: Pagination::Page { page },
            };
        };

        if is_initial_scroll(scroll_id) {
            return QueryPlan {
                criteria: requested,
                pagination: Pagination::Scroll { offset: 0 },
            };
        }

        match ScrollCursor::decode(scroll_id) {
            Ok(cursor) => {
                if cursor.is_expired(now, self.settings.scroll_ttl) {
                    report.push(
                        ErrorClass::InvalidScrollId,
                        "scrollId",
                        "Scroll id has expired; start a new search",
                    );
                }
                let mismatched = explicit_mismatches(params, &requested, &cursor.criteria);
                if !mismatched.is_empty() {
                    report.push(
                        ErrorClass::InvalidScrollId,
                        "scrollId",
                        format!(
                            "Scroll id belongs to a different query (differs in: {})",
                            mismatched.join(", ")
                        ),
                    );
                }
                QueryPlan {
                    criteria: cursor.criteria,
                    pagination: Pagination::Scroll {
                        offset: cursor.offset,
                    },
                }
            }
            Err(err) => {
                report.push(
                    ErrorClass::InvalidScrollId,
                    "scrollId",
                    format!("Malformed scroll id: {err}"),
                );
                QueryPlan {
                    criteria: requested,
                    pagination: Pagination::Scroll { offset: 0 },
                }
            }
        }
    }

    fn resolve_page(&self, page: Option<i64>, report: &mut ValidationReport) -> u64 {
        let page = page.unwrap_or(1);
        if let Some(msg) =
            registry::field(Entity::SearchParams, "page").and_then(|f| f.check_number(page))
        {
            report.push(ErrorClass::MalformedQuery, "page", msg);
        }
        page.max(1) as u64
    }

    fn criteria_from(&self, params: &SearchParams, report: &mut ValidationReport) -> QueryCriteria {
        let fallback = params.fallback.unwrap_or(false);

        if let Some(size) = params.page_size {
            if let Some(msg) =
                registry::field(Entity::SearchParams, "pageSize").and_then(|f| f.check_number(size))
            {
                report.push(ErrorClass::MalformedQuery, "pageSize", msg);
            }
        }
        let page_size = clamp_limit(
            params.page_size,
            self.settings.default_page_size,
            self.settings.max_page_size,
        );

        let language = match params.language.as_deref().map(str::trim) {
            Some(ALL_LANGUAGES) => ALL_LANGUAGES.to_string(),
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
            None if fallback => self.settings.default_language.clone(),
            None => ALL_LANGUAGES.to_string(),
        };

        let license = match params.license.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_LICENSES) => None,
            Some(code) => {
                if let Some(msg) = registry::field(Entity::SearchParams, "license")
                    .and_then(|f| f.check_text(code, self.registry))
                {
                    report.push(ErrorClass::UnknownLicense, "license", msg);
                }
                Some(code.to_string())
            }
        };

        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => Sort::default(),
            Some(raw) => Sort::parse(raw).unwrap_or_else(|| {
                report.push(
                    ErrorClass::MalformedQuery,
                    "sort",
                    format!(
                        "Invalid value '{raw}' for sort. Allowed: {}",
                        registry::allowed_values(Entity::SearchParams, "sort").join(", ")
                    ),
                );
                Sort::default()
            }),
        };

        let id_list = dedup(params.id_list.iter().copied());
        for id in &id_list {
            if *id < 1 {
                report.push(
                    ErrorClass::MalformedQuery,
                    "idList",
                    format!("Article ids must be positive, got {id}"),
                );
            }
        }

        let article_types = dedup(params.article_types.iter().map(|t| t.trim().to_string()));
        if let Some(def) = registry::field(Entity::SearchParams, "articleTypes") {
            for article_type in &article_types {
                if let Some(msg) = def.check_text(article_type, self.registry) {
                    report.push(ErrorClass::MalformedQuery, "articleTypes", msg);
                }
            }
        }

        let grep_codes = dedup(
            params
                .grep_codes
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        );

        let query = params
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from);

        QueryCriteria {
            query,
            language,
            fallback,
            license,
            id_list,
            article_types,
            grep_codes,
            sort,
            page_size,
        }
    }
}

/// Names of explicitly supplied request fields that disagree with a cursor.
fn explicit_mismatches(
    params: &SearchParams,
    requested: &QueryCriteria,
    cursor: &QueryCriteria,
) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if params.query.is_some() && requested.query != cursor.query {
        fields.push("query");
    }
    if params.language.is_some() && requested.language != cursor.language {
        fields.push("language");
    }
    if params.license.is_some() && requested.license != cursor.license {
        fields.push("license");
    }
    if params.fallback.is_some() && requested.fallback != cursor.fallback {
        fields.push("fallback");
    }
    if params.sort.is_some() && requested.sort != cursor.sort {
        fields.push("sort");
    }
    if params.page_size.is_some() && requested.page_size != cursor.page_size {
        fields.push("pageSize");
    }
    if !params.id_list.is_empty() && requested.id_list != cursor.id_list {
        fields.push("idList");
    }
    if !params.article_types.is_empty() && requested.article_types != cursor.article_types {
        fields.push("articleTypes");
    }
    if !params.grep_codes.is_empty() && requested.grep_codes != cursor.grep_codes {
        fields.push("grepCodes");
    }
    fields
}

/// Drop repeated values, keeping first occurrences in order.
fn dedup<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Query text helpers
// ---------------------------------------------------------------------------

/// Split user input into lowercase search terms.
///
/// - Splits on whitespace.
/// - Strips non-alphanumeric characters (except `-`) from each term's edges.
/// - Drops empty terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
