use crate::store::StoreError;
use crate::types::{ArticleId, Revision};
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: ArticleId },

    #[error("Validation failed: {}", .0.description)]
    Validation(ValidationError),

    #[error("Conflict: article {id} is no longer at revision {expected}")]
    Conflict { id: ArticleId, expected: Revision },

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound {
                entity: "Article",
                id,
            },
            StoreError::Conflict { id, expected, .. } => Self::Conflict { id, expected },
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
        }
    }
}
