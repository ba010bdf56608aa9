use std::path::PathBuf;

use article_core::search::{
    SearchSettings, DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_TTL_SECS, MAX_PAGE_SIZE,
};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Page sizes, scroll lifetime, and fallback language for searches.
    pub search: SearchSettings,
    /// Prefix of the `url` field in article summaries.
    pub article_url_base: String,
    /// JSON file of articles loaded at startup, if any.
    pub seed_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                          |
    /// |----------------------------|--------------------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                                        |
    /// | `PORT`                     | `3000`                                           |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`                          |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                                             |
    /// | `SEARCH_DEFAULT_PAGE_SIZE` | `10`                                             |
    /// | `SEARCH_MAX_PAGE_SIZE`     | `100`                                            |
    /// | `SCROLL_TTL_SECS`          | `60`                                             |
    /// | `DEFAULT_LANGUAGE`         | `nb`                                             |
    /// | `ARTICLE_URL_BASE`         | `http://localhost:3000/article-api/v2/articles`  |
    /// | `ARTICLE_SEED_PATH`        | unset                                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let default_page_size: u64 = std::env::var("SEARCH_DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("SEARCH_DEFAULT_PAGE_SIZE must be a valid u64");

        let max_page_size: u64 = std::env::var("SEARCH_MAX_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse()
            .expect("SEARCH_MAX_PAGE_SIZE must be a valid u64");
        assert!(
            (1..=max_page_size).contains(&default_page_size),
            "SEARCH_DEFAULT_PAGE_SIZE must be between 1 and SEARCH_MAX_PAGE_SIZE"
        );

        let scroll_ttl_secs: i64 = std::env::var("SCROLL_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SCROLL_TTL_SECS.to_string())
            .parse()
            .expect("SCROLL_TTL_SECS must be a valid i64");

        let default_language =
            std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.into());

        let article_url_base = std::env::var("ARTICLE_URL_BASE")
            .unwrap_or_else(|_| "http://localhost:3000/article-api/v2/articles".into());

        let seed_path = std::env::var("ARTICLE_SEED_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            search: SearchSettings {
                default_page_size,
                max_page_size,
                scroll_ttl: chrono::Duration::seconds(scroll_ttl_secs),
                default_language,
            },
            article_url_base,
            seed_path,
        }
    }
}
