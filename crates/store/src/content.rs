use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use article_core::article::Article;
use article_core::store::{ContentStore, StoreError};
use article_core::types::{ArticleId, Revision};

/// Article storage held in memory.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the API state and the search index. A compare-and-swap
/// checks and writes under a single write lock.
#[derive(Default)]
pub struct InMemoryContentStore {
    articles: RwLock<HashMap<ArticleId, Article>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let map = articles.into_iter().map(|a| (a.id, a)).collect();
        Self {
            articles: RwLock::new(map),
        }
    }

    /// Store `article` unconditionally, returning any article it replaced.
    ///
    /// Used for seeding; edits go through [`ContentStore::compare_and_swap`].
    pub async fn insert(&self, article: Article) -> Option<Article> {
        self.articles.write().await.insert(article.id, article)
    }

    pub async fn count(&self) -> usize {
        self.articles.read().await.len()
    }

    /// Copy of every stored article, ordered by id.
    pub async fn snapshot(&self) -> Vec<Article> {
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        articles.sort_by_key(|a| a.id);
        articles
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn load(&self, id: ArticleId) -> Result<Article, StoreError> {
        self.articles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn load_many(&self, ids: &[ArticleId]) -> Result<Vec<Article>, StoreError> {
        let articles = self.articles.read().await;
        ids.iter()
            .map(|id| articles.get(id).cloned().ok_or(StoreError::NotFound(*id)))
            .collect()
    }

    async fn compare_and_swap(
        &self,
        id: ArticleId,
        expected_revision: Revision,
        article: Article,
    ) -> Result<(), StoreError> {
        let mut articles = self.articles.write().await;
        let stored = articles.get(&id).ok_or(StoreError::NotFound(id))?;
        if stored.revision != expected_revision {
            tracing::warn!(
                article_id = id,
                expected = expected_revision,
                actual = stored.revision,
                "Revision conflict on write"
            );
            return Err(StoreError::Conflict {
                id,
                expected: expected_revision,
                actual: stored.revision,
            });
        }
        tracing::debug!(article_id = id, revision = article.revision, "Article stored");
        articles.insert(id, article);
        Ok(())
    }
}
