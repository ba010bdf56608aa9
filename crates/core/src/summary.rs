//! Result assembler: projects full articles into the listing, single-article,
//! dump, and tag-search response shapes.
//!
//! Projection picks one language per article with [`pick_language`]. Every
//! projected per-language value keeps its own `language` tag, so a client can
//! tell when it received a fallback.

use serde::Serialize;

use crate::article::{
    Article, Availability, Content, Copyright, Introduction, MetaDescription, MetaImage,
    RelatedContent, RequiredLibrary, Tags, Title, VisualElement,
};
use crate::language::pick_language;
use crate::search::QueryPlan;
use crate::store::TagPage;
use crate::types::{ArticleId, Revision, Timestamp};

// ---------------------------------------------------------------------------
// Search listing
// ---------------------------------------------------------------------------

/// Per-language projection of an article for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_element: Option<VisualElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Introduction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<MetaDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_image: Option<MetaImage>,
    pub url: String,
    pub license: String,
    pub article_type: String,
    pub last_updated: Timestamp,
    pub supported_languages: Vec<String>,
    pub grep_codes: Vec<String>,
    pub availability: Availability,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total_count: u64,
    /// Absent for scroll-addressed results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    pub page_size: u64,
    pub language: String,
    pub results: Vec<ArticleSummary>,
    /// Cursor for the next page. Sent as the `search-context` header, not in
    /// the body.
    #[serde(skip)]
    pub scroll_id: Option<String>,
}

/// Build a [`SearchResult`] from index hits loaded in order.
///
/// `total_count` is the count reported by the index, not `articles.len()`.
pub fn assemble(
    plan: &QueryPlan,
    total_count: u64,
    articles: &[Article],
    url_base: &str,
    scroll_id: Option<String>,
) -> SearchResult {
    let criteria = &plan.criteria;
    let results = articles
        .iter()
        .map(|article| summarize(article, &criteria.language, url_base))
        .collect();

    SearchResult {
        total_count,
        page: plan.page(),
        page_size: plan.page_size(),
        language: criteria.language.clone(),
        results,
        scroll_id,
    }
}

/// Project `article` into a summary in `language`, falling back to its
/// first supported language.
pub fn summarize(article: &Article, language: &str, url_base: &str) -> ArticleSummary {
    let lang = pick_language(article.supported_languages(), language, true).unwrap_or(language);

    ArticleSummary {
        id: article.id,
        title: article
            .title
            .get_or_first(lang, true)
            .cloned()
            .unwrap_or_else(|| Title {
                title: String::new(),
                language: lang.to_string(),
            }),
        visual_element: article.visual_element.get(lang).cloned(),
        introduction: article.introduction.get(lang).cloned(),
        meta_description: article.meta_description.get(lang).cloned(),
        meta_image: article.meta_image.get(lang).cloned(),
        url: article_url(url_base, article.id),
        license: article.copyright.license.license.clone(),
        article_type: article.article_type.clone(),
        last_updated: article.updated,
        supported_languages: article.supported_languages().to_vec(),
        grep_codes: article.grep_codes.clone(),
        availability: article.availability,
    }
}

pub fn article_url(url_base: &str, id: ArticleId) -> String {
    format!("{}/{id}", url_base.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Single-language article
// ---------------------------------------------------------------------------

/// A full article projected into one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleV2 {
    pub id: ArticleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_ndla_url: Option<String>,
    pub revision: Revision,
    pub title: Title,
    pub content: Content,
    pub copyright: Copyright,
    pub tags: Tags,
    pub required_libraries: Vec<RequiredLibrary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_element: Option<VisualElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_image: Option<MetaImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Introduction>,
    pub meta_description: MetaDescription,
    pub created: Timestamp,
    pub updated: Timestamp,
    pub updated_by: String,
    pub published: Timestamp,
    pub article_type: String,
    pub supported_languages: Vec<String>,
    pub grep_codes: Vec<String>,
    pub concept_ids: Vec<i64>,
    pub availability: Availability,
    pub related_content: Vec<RelatedContent>,
}

/// Project `article` into `language`.
///
/// Returns `None` when the article lacks `language` and `fallback` is off.
/// Required per-language fields missing in the chosen language are emitted
/// empty, tagged with that language.
pub fn project_article(article: &Article, language: &str, fallback: bool) -> Option<ArticleV2> {
    let lang = pick_language(article.supported_languages(), language, fallback)?;

    let title = article
        .title
        .get_or_first(lang, true)
        .cloned()
        .unwrap_or_else(|| Title {
            title: String::new(),
            language: lang.to_string(),
        });
    let content = article
        .content
        .get_or_first(lang, true)
        .cloned()
        .unwrap_or_else(|| Content {
            content: String::new(),
            language: lang.to_string(),
        });
    let tags = article.tags.get(lang).cloned().unwrap_or_else(|| Tags {
        tags: Vec::new(),
        language: lang.to_string(),
    });
    let meta_description = article
        .meta_description
        .get(lang)
        .cloned()
        .unwrap_or_else(|| MetaDescription {
            meta_description: String::new(),
            language: lang.to_string(),
        });

    Some(ArticleV2 {
        id: article.id,
        old_ndla_url: article.old_ndla_url.clone(),
        revision: article.revision,
        title,
        content,
        copyright: article.copyright.clone(),
        tags,
        required_libraries: article.required_libraries.clone(),
        visual_element: article.visual_element.get(lang).cloned(),
        meta_image: article.meta_image.get(lang).cloned(),
        introduction: article.introduction.get(lang).cloned(),
        meta_description,
        created: article.created,
        updated: article.updated,
        updated_by: article.updated_by.clone(),
        published: article.published,
        article_type: article.article_type.clone(),
        supported_languages: article.supported_languages().to_vec(),
        grep_codes: article.grep_codes.clone(),
        concept_ids: article.concept_ids.clone(),
        availability: article.availability,
        related_content: article.related_content.clone(),
    })
}

// ---------------------------------------------------------------------------
// Bulk export and tag search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDump {
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub language: String,
    pub results: Vec<ArticleV2>,
}

/// Build one page of a bulk export. Articles are projected into `language`
/// with fallback, so none are dropped.
pub fn assemble_dump(
    total_count: u64,
    page: u64,
    page_size: u64,
    language: &str,
    articles: &[Article],
) -> ArticleDump {
    ArticleDump {
        total_count,
        page,
        page_size,
        language: language.to_string(),
        results: articles
            .iter()
            .filter_map(|a| project_article(a, language, true))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsSearchResult {
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub language: String,
    pub results: Vec<String>,
}

pub fn paginate_tags(tags: TagPage, page: u64, page_size: u64, language: &str) -> TagsSearchResult {
    TagsSearchResult {
        total_count: tags.total_count,
        page,
        page_size,
        language: language.to_string(),
        results: tags.tags,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
