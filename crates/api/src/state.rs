use std::sync::Arc;

use article_core::registry::ContentRegistry;
use article_core::store::{ContentStore, SearchIndex};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Article storage with compare-and-swap writes.
    pub content: Arc<dyn ContentStore>,
    /// Search over stored articles.
    pub index: Arc<dyn SearchIndex>,
    /// License and author-type registries.
    pub registry: Arc<dyn ContentRegistry>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
