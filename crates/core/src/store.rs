//! Narrow interfaces to the external collaborators: the content store and
//! the search index.
//!
//! Core never performs I/O itself. The API layer drives these traits and
//! hands snapshots to the pure normalizer, assembler, and merger.

use async_trait::async_trait;
use serde::Serialize;

use crate::article::Article;
use crate::search::QueryPlan;
use crate::types::{ArticleId, Revision, Timestamp};

/// Failures reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Article {0} not found")]
    NotFound(ArticleId),

    #[error("Article {id} is at revision {actual}, expected {expected}")]
    Conflict {
        id: ArticleId,
        expected: Revision,
        actual: Revision,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent article storage with optimistic concurrency on `revision`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn load(&self, id: ArticleId) -> Result<Article, StoreError>;

    /// Load several articles, preserving the order of `ids`.
    async fn load_many(&self, ids: &[ArticleId]) -> Result<Vec<Article>, StoreError> {
        let mut articles = Vec::with_capacity(ids.len());
        for id in ids {
            articles.push(self.load(*id).await?);
        }
        Ok(articles)
    }

    /// Write `article` only if the stored revision is still
    /// `expected_revision`.
    async fn compare_and_swap(
        &self,
        id: ArticleId,
        expected_revision: Revision,
        article: Article,
    ) -> Result<(), StoreError>;
}

/// One page of index hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub total_count: u64,
    pub article_ids: Vec<ArticleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scroll_id: Option<String>,
}

/// Distinct tags matching a tag search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPage {
    pub total_count: u64,
    pub tags: Vec<String>,
}

/// Search over stored articles.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Execute a normalized plan. `now` stamps any issued scroll cursor.
    async fn query(&self, plan: &QueryPlan, now: Timestamp) -> Result<IndexPage, StoreError>;

    /// Distinct tags in `language` containing `query` (case-insensitive),
    /// sorted alphabetically.
    async fn search_tags(
        &self,
        query: &str,
        language: &str,
        page: u64,
        page_size: u64,
    ) -> Result<TagPage, StoreError>;

    /// Every article id in id order, optionally restricted to a language.
    async fn dump(
        &self,
        language: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> Result<IndexPage, StoreError>;
}
