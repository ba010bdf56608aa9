//! Article contract core.
//!
//! Pure validation and reconciliation logic for multilingual articles: the
//! schema registry, search query normalization, result assembly, and the
//! partial-publish merger. No I/O happens here; storage and search are
//! reached through the traits in [`store`].

pub mod article;
pub mod error;
pub mod language;
pub mod publish;
pub mod registry;
pub mod scroll;
pub mod search;
pub mod store;
pub mod summary;
pub mod types;
pub mod validation;
