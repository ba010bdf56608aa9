//! Startup seeding from a JSON array of articles.

use std::path::Path;

use article_core::article::Article;
use article_core::registry::ContentRegistry;
use article_core::types::ArticleId;
use article_core::validation::ValidationError;

use crate::content::InMemoryContentStore;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Seed file is not a JSON array of articles: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Seed article {id} is invalid: {source}")]
    Invalid {
        id: ArticleId,
        source: ValidationError,
    },
}

/// Parse and validate a JSON array of articles.
pub fn parse_seed(json: &str, registry: &dyn ContentRegistry) -> Result<Vec<Article>, SeedError> {
    let articles: Vec<Article> = serde_json::from_str(json)?;
    for article in &articles {
        article.validate(registry).map_err(|source| SeedError::Invalid {
            id: article.id,
            source,
        })?;
    }
    Ok(articles)
}

/// Load the seed file at `path` into `store`. Returns the number of
/// articles inserted.
pub async fn load_seed_file(
    store: &InMemoryContentStore,
    path: &Path,
    registry: &dyn ContentRegistry,
) -> Result<usize, SeedError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let articles = parse_seed(&json, registry)?;
    let count = articles.len();
    for article in articles {
        let id = article.id;
        if store.insert(article).await.is_some() {
            tracing::warn!(article_id = id, "Seed file repeats article id; last entry kept");
        }
    }
    tracing::info!(count, path = %path.display(), "Seeded articles");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::article;
    use article_core::registry::StandardRegistry;
    use article_core::store::ContentStore;
    use assert_matches::assert_matches;

    fn seed_json(articles: &[Article]) -> String {
        serde_json::to_string(articles).unwrap()
    }

    #[test]
    fn parses_valid_articles() {
        let json = seed_json(&[article(1, "nb", "A"), article(2, "nn", "B")]);
        let parsed = parse_seed(&json, &StandardRegistry).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].supported_languages(), &["nn"]);
    }

    #[test]
    fn rejects_invalid_article() {
        let mut bad = article(3, "nb", "C");
        bad.article_type = "blog".into();
        let json = seed_json(&[article(1, "nb", "A"), bad]);
        assert_matches!(
            parse_seed(&json, &StandardRegistry),
            Err(SeedError::Invalid { id: 3, .. })
        );
    }

    #[test]
    fn rejects_malformed_json() {
        assert_matches!(
            parse_seed("{\"id\": 1}", &StandardRegistry),
            Err(SeedError::Parse(_))
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let store = InMemoryContentStore::new();
        let result = load_seed_file(
            &store,
            Path::new("/nonexistent/articles.json"),
            &StandardRegistry,
        )
        .await;
        assert_matches!(result, Err(SeedError::Io { .. }));
    }

    #[tokio::test]
    async fn loads_file_into_store() {
        let path = std::env::temp_dir().join(format!("article-seed-{}.json", std::process::id()));
        std::fs::write(&path, seed_json(&[article(4, "nb", "D")])).unwrap();

        let store = InMemoryContentStore::new();
        let count = load_seed_file(&store, &path, &StandardRegistry).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(count, 1);
        assert_eq!(store.load(4).await.unwrap().revision, 1);
    }
}
