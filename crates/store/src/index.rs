//! Search index over the in-memory content store.
//!
//! Every query scans a snapshot of the store. Relevance is a weighted count
//! of query-term hits per field, searched in the plan's language when the
//! article has it and across all languages otherwise.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use article_core::article::Article;
use article_core::language::{pick_language, LanguageField, LanguageMap, ALL_LANGUAGES};
use article_core::search::{query_terms, QueryCriteria, QueryPlan, Sort};
use article_core::store::{IndexPage, SearchIndex, StoreError, TagPage};
use article_core::types::{ArticleId, Timestamp};

use crate::content::InMemoryContentStore;

// ---------------------------------------------------------------------------
// Relevance weights
// ---------------------------------------------------------------------------

const TITLE_WEIGHT: u32 = 4;
const TAG_WEIGHT: u32 = 3;
const SUMMARY_WEIGHT: u32 = 2;
const CONTENT_WEIGHT: u32 = 1;

/// Scans the shared [`InMemoryContentStore`] on every query.
pub struct InMemorySearchIndex {
    store: Arc<InMemoryContentStore>,
}

impl InMemorySearchIndex {
    pub fn new(store: Arc<InMemoryContentStore>) -> Self {
        Self { store }
    }
}

struct Hit<'a> {
    article: &'a Article,
    score: u32,
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn query(&self, plan: &QueryPlan, now: Timestamp) -> Result<IndexPage, StoreError> {
        let articles = self.store.snapshot().await;
        let criteria = &plan.criteria;
        let terms = criteria.query.as_deref().map(query_terms).unwrap_or_default();

        let mut hits: Vec<Hit<'_>> = articles
            .iter()
            .filter(|a| matches_filters(a, criteria))
            .filter_map(|article| {
                let score = relevance(article, &criteria.language, &terms);
                (terms.is_empty() || score > 0).then_some(Hit { article, score })
            })
            .collect();
        hits.sort_by(|a, b| compare_hits(a, b, criteria));

        let total_count = hits.len() as u64;
        let article_ids = page_of(&hits, plan.offset(), plan.page_size())
            .iter()
            .map(|h| h.article.id)
            .collect();
        let next_scroll_id = plan.next_scroll_id(total_count, now);

        tracing::debug!(
            total_count,
            offset = plan.offset(),
            page_size = plan.page_size(),
            scroll = plan.is_scroll(),
            "Search index query"
        );

        Ok(IndexPage {
            total_count,
            article_ids,
            next_scroll_id,
        })
    }

    async fn search_tags(
        &self,
        query: &str,
        language: &str,
        page: u64,
        page_size: u64,
    ) -> Result<TagPage, StoreError> {
        let needle = query.trim().to_lowercase();
        let articles = self.store.snapshot().await;

        let mut distinct = BTreeSet::new();
        for article in &articles {
            for entry in &article.tags {
                if language != ALL_LANGUAGES && entry.language != language {
                    continue;
                }
                for tag in &entry.tags {
                    if tag.to_lowercase().contains(&needle) {
                        distinct.insert(tag.clone());
                    }
                }
            }
        }

        let tags: Vec<String> = distinct.into_iter().collect();
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        Ok(TagPage {
            total_count: tags.len() as u64,
            tags: page_of(&tags, offset, page_size).to_vec(),
        })
    }

    async fn dump(
        &self,
        language: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<IndexPage, StoreError> {
        let ids: Vec<ArticleId> = self
            .store
            .snapshot()
            .await
            .iter()
            .filter(|a| match language {
                None | Some(ALL_LANGUAGES) => true,
                Some(lang) => a.supported_languages().iter().any(|l| l == lang),
            })
            .map(|a| a.id)
            .collect();

        let offset = page.saturating_sub(1).saturating_mul(page_size);
        Ok(IndexPage {
            total_count: ids.len() as u64,
            article_ids: page_of(&ids, offset, page_size).to_vec(),
            next_scroll_id: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

fn matches_filters(article: &Article, criteria: &QueryCriteria) -> bool {
    let language_ok = criteria.is_all_languages()
        || criteria.fallback
        || article
            .supported_languages()
            .iter()
            .any(|l| *l == criteria.language);

    let license_ok = criteria
        .license
        .as_deref()
        .map_or(true, |code| article.copyright.license.license == code);

    let ids_ok = criteria.id_list.is_empty() || criteria.id_list.contains(&article.id);

    let type_ok =
        criteria.article_types.is_empty() || criteria.article_types.contains(&article.article_type);

    let grep_ok = criteria.grep_codes.is_empty()
        || article
            .grep_codes
            .iter()
            .any(|c| criteria.grep_codes.contains(c));

    language_ok && license_ok && ids_ok && type_ok && grep_ok
}

/// Weighted count of query terms found in the article's text.
fn relevance(article: &Article, language: &str, terms: &[String]) -> u32 {
    if terms.is_empty() {
        return 0;
    }
    let scoped = (language != ALL_LANGUAGES && article.has_content_in(language)).then_some(language);

    let mut score = 0;
    score += TITLE_WEIGHT * term_hits(&article.title, scoped, terms, |t| t.title.clone());
    score += TAG_WEIGHT * term_hits(&article.tags, scoped, terms, |t| t.tags.join(" "));
    score += SUMMARY_WEIGHT
        * term_hits(&article.introduction, scoped, terms, |i| i.introduction.clone());
    score += SUMMARY_WEIGHT
        * term_hits(&article.meta_description, scoped, terms, |m| m.meta_description.clone());
    score += CONTENT_WEIGHT * term_hits(&article.content, scoped, terms, |c| c.content.clone());
    score
}

fn term_hits<T: LanguageField>(
    map: &LanguageMap<T>,
    language: Option<&str>,
    terms: &[String],
    text: impl Fn(&T) -> String,
) -> u32 {
    map.iter()
        .filter(|entry| language.map_or(true, |l| entry.language() == l))
        .map(|entry| {
            let haystack = text(entry).to_lowercase();
            terms.iter().filter(|t| haystack.contains(t.as_str())).count() as u32
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Ordering and paging
// ---------------------------------------------------------------------------

fn compare_hits(a: &Hit<'_>, b: &Hit<'_>, criteria: &QueryCriteria) -> Ordering {
    let ordering = match criteria.sort {
        Sort::RelevanceDesc => b
            .score
            .cmp(&a.score)
            .then_with(|| b.article.updated.cmp(&a.article.updated)),
        Sort::RelevanceAsc => a
            .score
            .cmp(&b.score)
            .then_with(|| a.article.updated.cmp(&b.article.updated)),
        Sort::TitleAsc => sort_title(a.article, criteria).cmp(&sort_title(b.article, criteria)),
        Sort::TitleDesc => sort_title(b.article, criteria).cmp(&sort_title(a.article, criteria)),
        Sort::LastUpdatedAsc => a.article.updated.cmp(&b.article.updated),
        Sort::LastUpdatedDesc => b.article.updated.cmp(&a.article.updated),
        Sort::IdAsc => a.article.id.cmp(&b.article.id),
        Sort::IdDesc => b.article.id.cmp(&a.article.id),
    };
    ordering.then_with(|| a.article.id.cmp(&b.article.id))
}

/// Lowercased title in the language the article would be projected in.
fn sort_title(article: &Article, criteria: &QueryCriteria) -> String {
    pick_language(article.supported_languages(), &criteria.language, true)
        .and_then(|lang| article.title.get_or_first(lang, true))
        .map(|t| t.title.to_lowercase())
        .unwrap_or_default()
}

fn page_of<T>(items: &[T], offset: u64, page_size: u64) -> &[T] {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
    let end = start
        .saturating_add(usize::try_from(page_size).unwrap_or(usize::MAX))
        .min(items.len());
    &items[start..end]
}
