//! Partial publish: validate a sparse patch and merge it into a stored
//! article.
//!
//! All checks run against the unmodified article first. Only a patch with no
//! violations is applied, so a rejected patch never leaves a half-merged
//! article behind.

use serde::{Deserialize, Serialize};

use crate::article::{Article, Availability, MetaDescription, RelatedContent, Tags};
use crate::error::CoreError;
use crate::language::{is_valid_language_tag, LanguageField};
use crate::registry::{self, ContentRegistry, Entity};
use crate::store::ContentStore;
use crate::types::ArticleId;
use crate::validation::{ErrorClass, ValidationReport};

/// Sparse update of the republishable fields. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPublishPatch {
    /// Raw wire value; checked against the availability enumeration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grep_codes: Option<Vec<String>>,
    /// License code, resolved against the license registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<Vec<MetaDescription>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_content: Option<Vec<RelatedContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tags>>,
}

impl PartialPublishPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub article: Article,
    /// Whether any stored value differs from the input article. The revision
    /// was bumped iff this is set.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Validate `patch` against `current` and merge it.
///
/// Patch violations come back as [`CoreError::Validation`]. A changed
/// article whose revision cannot be incremented is [`CoreError::Internal`].
pub fn merge(
    current: &Article,
    patch: &PartialPublishPatch,
    registry: &dyn ContentRegistry,
) -> Result<MergeOutcome, CoreError> {
    let mut report = ValidationReport::new();

    let availability = patch
        .availability
        .as_deref()
        .and_then(|raw| check_availability(raw, registry, &mut report));
    if let Some(codes) = &patch.grep_codes {
        check_grep_codes(codes, &mut report);
    }
    let license = patch.license.as_deref().and_then(|code| {
        let found = registry.lookup(code);
        if found.is_none() {
            report.push(
                ErrorClass::UnknownLicense,
                "license",
                format!("'{code}' is not a recognized license"),
            );
        }
        found
    });
    if let Some(entries) = &patch.meta_description {
        check_language_entries(current, "metaDescription", entries, &mut report);
    }
    if let Some(related) = &patch.related_content {
        check_related_content(related, &mut report);
    }
    if let Some(entries) = &patch.tags {
        check_language_entries(current, "tags", entries, &mut report);
    }

    if let Some(err) = report.finish() {
        return Err(err.into());
    }

    let mut merged = current.clone();
    if let Some(availability) = availability {
        merged.availability = availability;
    }
    if let Some(codes) = &patch.grep_codes {
        merged.grep_codes = codes.iter().map(|c| c.trim().to_string()).collect();
    }
    if let Some(license) = license {
        merged.copyright.license = license;
    }
    if let Some(entries) = &patch.meta_description {
        for entry in entries {
            merged.meta_description.upsert(entry.clone());
        }
    }
    if let Some(related) = &patch.related_content {
        merged.related_content = related.clone();
    }
    if let Some(entries) = &patch.tags {
        for entry in entries {
            merged.tags.upsert(normalize_tags(entry));
        }
    }
    merged.refresh_supported_languages();

    let changed = merged != *current;
    if changed {
        merged.revision = current.revision.checked_add(1).ok_or_else(|| {
            CoreError::Internal(format!(
                "article {} is at revision {} and cannot be revised further",
                current.id, current.revision
            ))
        })?;
    }
    Ok(MergeOutcome {
        article: merged,
        changed,
    })
}

fn check_availability(
    raw: &str,
    registry: &dyn ContentRegistry,
    report: &mut ValidationReport,
) -> Option<Availability> {
    let def = registry::field(Entity::PartialPublishPatch, "availability")?;
    if let Some(msg) = def.check_text(raw, registry) {
        report.push(ErrorClass::InvalidPatch, "availability", msg);
        return None;
    }
    Availability::parse(raw)
}

fn check_grep_codes(codes: &[String], report: &mut ValidationReport) {
    let mut seen: Vec<&str> = Vec::new();
    for code in codes.iter().map(|c| c.trim()) {
        if code.is_empty() {
            report.push(ErrorClass::InvalidPatch, "grepCodes", "grep codes must not be blank");
        } else if seen.contains(&code) {
            report.push(
                ErrorClass::InvalidPatch,
                "grepCodes",
                format!("grep code '{code}' occurs more than once"),
            );
        } else {
            seen.push(code);
        }
    }
}

fn check_related_content(related: &[RelatedContent], report: &mut ValidationReport) {
    for item in related {
        match item {
            RelatedContent::Reference(id) => report.check(
                *id > 0,
                ErrorClass::InvalidPatch,
                "relatedContent",
                format!("related article id must be positive, got {id}"),
            ),
            RelatedContent::Link { title, url } => {
                report.check(
                    !title.trim().is_empty(),
                    ErrorClass::InvalidPatch,
                    "relatedContent",
                    "related link title must not be blank",
                );
                report.check(
                    is_absolute_http_url(url),
                    ErrorClass::InvalidPatch,
                    "relatedContent",
                    format!("'{url}' is not an absolute http(s) url"),
                );
            }
        }
    }
}

fn is_absolute_http_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Language checks shared by per-language patch fields.
///
/// Each entry needs a valid tag, at most one entry per language, and an
/// article with title or content in that language.
fn check_language_entries<T: LanguageField>(
    current: &Article,
    field: &str,
    entries: &[T],
    report: &mut ValidationReport,
) {
    let mut seen: Vec<&str> = Vec::new();
    for entry in entries {
        let lang = entry.language();
        if !is_valid_language_tag(lang) {
            report.push(
                ErrorClass::InvalidPatch,
                format!("{field}.language"),
                format!("'{lang}' is not a valid language tag"),
            );
            continue;
        }
        if seen.contains(&lang) {
            report.push(
                ErrorClass::InvalidPatch,
                format!("{field}.language"),
                format!("language '{lang}' occurs more than once in the patch"),
            );
            continue;
        }
        seen.push(lang);
        if !current.has_content_in(lang) {
            report.push(
                ErrorClass::LanguageMismatch,
                field,
                format!(
                    "Article {} has no title or content in language '{lang}'",
                    current.id
                ),
            );
        }
    }
}

fn normalize_tags(entry: &Tags) -> Tags {
    Tags {
        tags: entry
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        language: entry.language.clone(),
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Load, merge, and write back with compare-and-swap on the loaded revision.
///
/// An unchanged merge is not written. Returns the article as stored after
/// the call.
pub async fn publish_partial(
    store: &dyn ContentStore,
    registry: &dyn ContentRegistry,
    id: ArticleId,
    patch: &PartialPublishPatch,
) -> Result<Article, CoreError> {
    let current = store.load(id).await?;
    let outcome = merge(&current, patch, registry)?;
    if outcome.changed {
        store
            .compare_and_swap(id, current.revision, outcome.article.clone())
            .await?;
    }
    Ok(outcome.article)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::fixtures::article;
    use crate::registry::StandardRegistry;
    use crate::store::StoreError;
    use crate::types::Revision;
    use crate::validation::ValidationError;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn patch(value: serde_json::Value) -> PartialPublishPatch {
        serde_json::from_value(value).unwrap()
    }

    fn rejected(result: Result<MergeOutcome, CoreError>) -> ValidationError {
        match result {
            Err(CoreError::Validation(err)) => err,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn at_revision(revision: Revision) -> Article {
        let mut a = article(1, &["nb", "nn"]);
        a.revision = revision;
        a
    }

    // -- merge ---------------------------------------------------------------

    #[test]
    fn empty_patch_changes_nothing() {
        let current = at_revision(2);
        let outcome = merge(&current, &PartialPublishPatch::default(), &StandardRegistry).unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.article, current);
    }

    #[test]
    fn availability_bumps_revision_once() {
        let current = at_revision(3);
        let outcome = merge(&current, &patch(json!({"availability": "student"})), &StandardRegistry)
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.article.revision, 4);
        assert_eq!(outcome.article.availability, Availability::Student);
    }

    #[test]
    fn same_value_is_not_a_change() {
        let current = at_revision(3);
        let outcome = merge(&current, &patch(json!({"availability": "everyone"})), &StandardRegistry)
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.article.revision, 3);
    }

    #[test]
    fn license_is_resolved_from_registry() {
        let current = at_revision(1);
        let outcome =
            merge(&current, &patch(json!({"license": "CC-BY-4.0"})), &StandardRegistry).unwrap();
        let license = &outcome.article.copyright.license;
        assert_eq!(license.license, "CC-BY-4.0");
        assert!(license.url.as_deref().unwrap().contains("creativecommons.org"));
        assert_eq!(outcome.article.copyright.creators, current.copyright.creators);
    }

    #[test]
    fn meta_description_replaces_matching_language_only() {
        let mut current = at_revision(1);
        current.meta_description.upsert(MetaDescription {
            meta_description: "Gammel".into(),
            language: "nb".into(),
        });
        current.meta_description.upsert(MetaDescription {
            meta_description: "Gamal".into(),
            language: "nn".into(),
        });
        current.refresh_supported_languages();

        let outcome = merge(
            &current,
            &patch(json!({"metaDescription": [{"metaDescription": "Ny", "language": "nb"}]})),
            &StandardRegistry,
        )
        .unwrap();
        let meta = &outcome.article.meta_description;
        assert_eq!(meta.get("nb").unwrap().meta_description, "Ny");
        assert_eq!(meta.get("nn").unwrap().meta_description, "Gamal");
        assert_eq!(
            outcome.article.supported_languages(),
            outcome.article.compute_supported_languages().as_slice()
        );
    }

    #[test]
    fn meta_description_for_missing_language_is_rejected() {
        let current = at_revision(2);
        let err = rejected(merge(
            &current,
            &patch(json!({
                "availability": "teacher",
                "metaDescription": [{"metaDescription": "Kurz", "language": "de"}]
            })),
            &StandardRegistry,
        ));
        assert_eq!(err.code, "LANGUAGE_MISMATCH");
        assert_eq!(err.fields(), vec!["metaDescription"]);
    }

    #[test]
    fn tags_are_trimmed_and_blank_ones_dropped() {
        let current = at_revision(1);
        let outcome = merge(
            &current,
            &patch(json!({"tags": [{"tags": [" fysikk ", "", "  ", "kraft"], "language": "nn"}]})),
            &StandardRegistry,
        )
        .unwrap();
        assert_eq!(outcome.article.tags.get("nn").unwrap().tags, vec!["fysikk", "kraft"]);
    }

    #[test]
    fn every_violation_is_reported_in_field_order() {
        let current = at_revision(1);
        let err = rejected(merge(
            &current,
            &patch(json!({
                "availability": "parents",
                "grepCodes": ["KE1", "KE1", " "],
                "license": "GPL-3.0",
                "relatedContent": [0, {"title": "", "url": "ftp://example.org"}],
                "tags": [
                    {"tags": ["a"], "language": "nb"},
                    {"tags": ["b"], "language": "nb"},
                    {"tags": ["c"], "language": "Bokmål"}
                ]
            })),
            &StandardRegistry,
        ));

        assert_eq!(err.code, "INVALID_PATCH");
        assert_eq!(
            err.fields(),
            vec![
                "availability",
                "grepCodes",
                "grepCodes",
                "license",
                "relatedContent",
                "relatedContent",
                "relatedContent",
                "tags.language",
                "tags.language",
            ]
        );
    }

    #[test]
    fn unknown_license_first_sets_code() {
        let err = rejected(merge(
            &at_revision(1),
            &patch(json!({"license": "GPL"})),
            &StandardRegistry,
        ));
        assert_eq!(err.code, "UNKNOWN_LICENSE");
    }

    #[test]
    fn revision_at_upper_bound_is_not_wrapped() {
        let current = at_revision(Revision::MAX);
        let result = merge(&current, &patch(json!({"availability": "student"})), &StandardRegistry);
        assert_matches!(result, Err(CoreError::Internal(ref msg)) if msg.contains("revision"));

        let unchanged = merge(&current, &PartialPublishPatch::default(), &StandardRegistry).unwrap();
        assert_eq!(unchanged.article.revision, Revision::MAX);
    }

    #[test]
    fn related_content_accepts_mixed_entries() {
        let outcome = merge(
            &at_revision(1),
            &patch(json!({"relatedContent": [42, {"title": "NDLA", "url": "https://ndla.no/a"}]})),
            &StandardRegistry,
        )
        .unwrap();
        assert_eq!(outcome.article.related_content.len(), 2);
        assert!(outcome.changed);
    }

    #[test]
    fn patch_is_empty() {
        assert!(PartialPublishPatch::default().is_empty());
        assert!(!patch(json!({"grepCodes": []})).is_empty());
    }

    // -- publish_partial -----------------------------------------------------

    #[derive(Default)]
    struct MemoryStore {
        articles: Mutex<HashMap<ArticleId, Article>>,
        writes: Mutex<usize>,
    }

    impl MemoryStore {
        fn with(article: Article) -> Self {
            let store = Self::default();
            store.articles.lock().unwrap().insert(article.id, article);
            store
        }
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn load(&self, id: ArticleId) -> Result<Article, StoreError> {
            self.articles
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(StoreError::NotFound(id))
        }

        async fn compare_and_swap(
            &self,
            id: ArticleId,
            expected_revision: Revision,
            article: Article,
        ) -> Result<(), StoreError> {
            let mut articles = self.articles.lock().unwrap();
            let stored = articles.get(&id).ok_or(StoreError::NotFound(id))?;
            if stored.revision != expected_revision {
                return Err(StoreError::Conflict {
                    id,
                    expected: expected_revision,
                    actual: stored.revision,
                });
            }
            articles.insert(id, article);
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_writes_merged_article() {
        let store = MemoryStore::with(at_revision(3));
        let updated = publish_partial(
            &store,
            &StandardRegistry,
            1,
            &patch(json!({"availability": "student"})),
        )
        .await
        .unwrap();
        assert_eq!(updated.revision, 4);
        assert_eq!(store.load(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn unchanged_publish_skips_write() {
        let store = MemoryStore::with(at_revision(3));
        publish_partial(&store, &StandardRegistry, 1, &PartialPublishPatch::default())
            .await
            .unwrap();
        assert_eq!(*store.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_article_is_not_found() {
        let store = MemoryStore::default();
        let result =
            publish_partial(&store, &StandardRegistry, 9, &PartialPublishPatch::default()).await;
        assert_matches!(result, Err(CoreError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn rejected_patch_leaves_store_untouched() {
        let original = at_revision(2);
        let store = MemoryStore::with(original.clone());
        let result = publish_partial(
            &store,
            &StandardRegistry,
            1,
            &patch(json!({"metaDescription": [{"metaDescription": "x", "language": "de"}]})),
        )
        .await;
        assert_matches!(result, Err(CoreError::Validation(ref e)) if e.code == "LANGUAGE_MISMATCH");
        assert_eq!(store.load(1).await.unwrap(), original);
    }

    #[tokio::test]
    async fn second_merge_from_same_revision_conflicts() {
        let store = MemoryStore::with(at_revision(5));
        let snapshot = store.load(1).await.unwrap();

        let first = merge(&snapshot, &patch(json!({"availability": "teacher"})), &StandardRegistry)
            .unwrap();
        let second = merge(&snapshot, &patch(json!({"grepCodes": ["KM1"]})), &StandardRegistry)
            .unwrap();

        store
            .compare_and_swap(1, snapshot.revision, first.article)
            .await
            .unwrap();
        let err = store
            .compare_and_swap(1, snapshot.revision, second.article)
            .await
            .unwrap_err();
        assert_matches!(
            CoreError::from(err),
            CoreError::Conflict {
                id: 1,
                expected: 5
            }
        );
    }
}
