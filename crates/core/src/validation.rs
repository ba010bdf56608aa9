//! Validation reporter: collects field-level violations from the query
//! normalizer and the partial-publish merger into one error envelope.
//!
//! Checks never short-circuit. Every violated constraint becomes one
//! [`ValidationMessage`], in the order the checks ran.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Error class of a violation. Each class maps to a stable `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// Search request fields out of range or not recognized.
    MalformedQuery,
    /// Scroll cursor cannot be decoded, belongs to another query, or expired.
    InvalidScrollId,
    /// License code not present in the license registry.
    UnknownLicense,
    /// Per-language patch entry targets a language the article lacks.
    LanguageMismatch,
    /// Any other rejected partial-publish field.
    InvalidPatch,
    /// A stored or seeded article violates the data model.
    InvalidArticle,
}

impl ErrorClass {
    pub fn code(self) -> &'static str {
        match self {
            Self::MalformedQuery => "MALFORMED_QUERY",
            Self::InvalidScrollId => "INVALID_SCROLL_ID",
            Self::UnknownLicense => "UNKNOWN_LICENSE",
            Self::LanguageMismatch => "LANGUAGE_MISMATCH",
            Self::InvalidPatch => "INVALID_PATCH",
            Self::InvalidArticle => "INVALID_ARTICLE",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::MalformedQuery => "The search request is malformed",
            Self::InvalidScrollId => "The scroll id is invalid, expired, or belongs to another query",
            Self::UnknownLicense => "The license is not recognized",
            Self::LanguageMismatch => "The patch targets a language the article has no content in",
            Self::InvalidPatch => "The partial publish request is invalid",
            Self::InvalidArticle => "The article is invalid",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub field: String,
    pub message: String,
}

/// The single error envelope for request-validation failures.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {description}")]
pub struct ValidationError {
    pub code: String,
    pub description: String,
    pub messages: Vec<ValidationMessage>,
    pub occured_at: Timestamp,
}

impl ValidationError {
    /// Build an error of `class`; `occured_at` is the construction time.
    pub fn new(class: ErrorClass, messages: Vec<ValidationMessage>) -> Self {
        Self {
            code: class.code().to_string(),
            description: class.description().to_string(),
            messages,
            occured_at: chrono::Utc::now(),
        }
    }

    /// Fields cited by the messages, in order.
    pub fn fields(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.field.as_str()).collect()
    }
}

/// Accumulator for violations found by a validating component.
#[derive(Debug, Default)]
pub struct ValidationReport {
    entries: Vec<(ErrorClass, ValidationMessage)>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn push(&mut self, class: ErrorClass, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push((
            class,
            ValidationMessage {
                field: field.into(),
                message: message.into(),
            },
        ));
    }

    /// Record a violation when `condition` is false.
    pub fn check(
        &mut self,
        condition: bool,
        class: ErrorClass,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        if !condition {
            self.push(class, field, message);
        }
    }

    /// Append every violation of `other`, keeping order.
    pub fn extend(&mut self, other: ValidationReport) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Build the error envelope, or `None` if nothing was recorded.
    ///
    /// The code is the class of the first recorded violation.
    pub fn finish(self) -> Option<ValidationError> {
        let class = self.entries.first()?.0;
        let messages = self.entries.into_iter().map(|(_, m)| m).collect();
        Some(ValidationError::new(class, messages))
    }

    /// `Ok(value)` when nothing was recorded, otherwise the envelope.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationError> {
        match self.finish() {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }
}
