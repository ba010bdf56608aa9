//! Language-tagged values and the generic container that holds one entry per
//! language.
//!
//! Every per-language article field (title, content, tags, introduction,
//! meta description, meta image, visual element) is stored as a
//! [`LanguageMap`], so lookup, fallback, and merge behaviour live here once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel language meaning "every language" in queries and results.
pub const ALL_LANGUAGES: &str = "*";

/// Primary subtag of 2-3 letters, optionally followed by 2-8 character
/// alphanumeric subtags (`nb`, `en-GB`, `zh-Hans`, `und`).
const LANGUAGE_TAG_PATTERN: &str = r"^[a-z]{2,3}(-[A-Za-z0-9]{2,8})*$";

static LANGUAGE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(LANGUAGE_TAG_PATTERN).expect("valid regex"));

/// Check whether `tag` is a recognized IETF-style language tag.
pub fn is_valid_language_tag(tag: &str) -> bool {
    LANGUAGE_TAG_RE.is_match(tag)
}

/// A value that belongs to exactly one language.
pub trait LanguageField {
    fn language(&self) -> &str;
}

/// Ordered collection holding at most one entry per language.
///
/// Order is the order in which languages were first attached; replacing an
/// existing language's entry keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageMap<T>(Vec<T>);

impl<T> Default for LanguageMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: LanguageField> LanguageMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from raw entries, keeping the last entry for a repeated
    /// language at the position of its first occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = T>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.put(entry);
        }
        map
    }

    /// Entry for exactly `language`.
    pub fn get(&self, language: &str) -> Option<&T> {
        self.0.iter().find(|e| e.language() == language)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Entry for `language`, or the first attached entry when allowed.
    pub fn get_or_first(&self, language: &str, fallback: bool) -> Option<&T> {
        self.get(language)
            .or_else(|| if fallback { self.0.first() } else { None })
    }

    /// Insert or replace the entry for the entry's language.
    fn put(&mut self, entry: T) {
        match self.0.iter().position(|e| e.language() == entry.language()) {
            Some(idx) => self.0[idx] = entry,
            None => self.0.push(entry),
        }
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.language())
    }

    /// Languages that occur more than once. Only possible for maps built
    /// through deserialization.
    pub fn duplicate_languages(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dupes = Vec::new();
        for lang in self.languages() {
            if seen.contains(&lang) {
                if !dupes.iter().any(|d: &String| d == lang) {
                    dupes.push(lang.to_string());
                }
            } else {
                seen.push(lang);
            }
        }
        dupes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: LanguageField + PartialEq> LanguageMap<T> {
    /// Insert or replace the entry for its language.
    ///
    /// Returns `true` if the stored value actually changed.
    pub fn upsert(&mut self, entry: T) -> bool {
        if self.get(entry.language()) == Some(&entry) {
            return false;
        }
        self.put(entry);
        true
    }
}

impl<T: LanguageField> FromIterator<T> for LanguageMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<'a, T> IntoIterator for &'a LanguageMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pick the language to project an article in.
///
/// - `*` selects the first supported language.
/// - A supported `requested` language is used as-is.
/// - Otherwise the first supported language is used if `fallback` is set.
pub fn pick_language<'a>(
    supported: &'a [String],
    requested: &str,
    fallback: bool,
) -> Option<&'a str> {
    if requested == ALL_LANGUAGES {
        return supported.first().map(String::as_str);
    }
    if let Some(lang) = supported.iter().find(|l| *l == requested) {
        return Some(lang.as_str());
    }
    if fallback {
        supported.first().map(String::as_str)
    } else {
        None
    }
}
