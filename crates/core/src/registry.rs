//! Schema/type registry: field definitions and constraints for every entity
//! of the article contract, plus the license and author-type registries.
//!
//! This is a compile-time schema. The query normalizer and the
//! partial-publish merger read enumerations and constraints from here instead
//! of keeping their own rule tables.

use serde::Serialize;

use crate::article::License;
use crate::language::is_valid_language_tag;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Recognized `availability` values.
pub const AVAILABILITY_VALUES: &[&str] = &["everyone", "student", "teacher"];

/// Recognized `articleType` values.
pub const ARTICLE_TYPES: &[&str] = &["standard", "topic-article", "frontpage-article"];

/// Recognized `sort` values. A leading `-` means descending.
pub const SORT_VALUES: &[&str] = &[
    "relevance",
    "-relevance",
    "title",
    "-title",
    "lastUpdated",
    "-lastUpdated",
    "id",
    "-id",
];

/// License filter value that disables license filtering.
pub const ALL_LICENSES: &str = "all";

// ---------------------------------------------------------------------------
// Field definitions
// ---------------------------------------------------------------------------

/// Entities described by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Entity {
    Article,
    ArticleSummary,
    Copyright,
    License,
    Author,
    Tag,
    VisualElement,
    SearchParams,
    SearchResult,
    ValidationError,
    PartialPublishPatch,
}

/// Wire type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Timestamp,
    TextList,
    IntegerList,
    /// A nested entity, by name.
    Entity(&'static str),
    /// A sequence of nested entities, by name.
    EntityList(&'static str),
    /// One language-tagged entry per language, by entry name.
    PerLanguage(&'static str),
    /// Mixed sequence of article references and links.
    RelatedContent,
}

/// Role an author is listed under in a copyright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    Creators,
    Processors,
    Rightsholders,
}

impl AuthorRole {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Creators => "creators",
            Self::Processors => "processors",
            Self::Rightsholders => "rightsholders",
        }
    }
}

/// Declared constraint on a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    None,
    /// Value must be one of the listed strings.
    OneOf(&'static [&'static str]),
    /// Value must resolve in the license registry.
    LicenseCode,
    /// Value must be a recognized language tag.
    LanguageTag,
    /// Value must be a known author type for the role.
    AuthorType(AuthorRole),
    /// Numeric value must be at least this.
    Min(i64),
    /// Sequence must not contain duplicates or blank items.
    Unique,
    /// Text must not be blank.
    NonBlank,
}

/// Definition of a single entity field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDef {
    /// Wire (camelCase) field name.
    pub name: &'static str,
    pub field_type: FieldType,
    pub optional: bool,
    pub constraint: Constraint,
}

const fn required(name: &'static str, field_type: FieldType, constraint: Constraint) -> FieldDef {
    FieldDef {
        name,
        field_type,
        optional: false,
        constraint,
    }
}

const fn optional(name: &'static str, field_type: FieldType, constraint: Constraint) -> FieldDef {
    FieldDef {
        name,
        field_type,
        optional: true,
        constraint,
    }
}

use Constraint as C;
use FieldType as T;

const ARTICLE_FIELDS: &[FieldDef] = &[
    required("id", T::Integer, C::Min(1)),
    required("revision", T::Integer, C::Min(1)),
    required("title", T::PerLanguage("Title"), C::None),
    required("content", T::PerLanguage("Content"), C::None),
    required("tags", T::PerLanguage("Tag"), C::None),
    optional("introduction", T::PerLanguage("Introduction"), C::None),
    required("metaDescription", T::PerLanguage("MetaDescription"), C::None),
    optional("metaImage", T::PerLanguage("MetaImage"), C::None),
    optional("visualElement", T::PerLanguage("VisualElement"), C::None),
    required("copyright", T::Entity("Copyright"), C::None),
    required("requiredLibraries", T::EntityList("RequiredLibrary"), C::None),
    required("articleType", T::Text, C::OneOf(ARTICLE_TYPES)),
    required("grepCodes", T::TextList, C::Unique),
    required("conceptIds", T::IntegerList, C::None),
    required("availability", T::Text, C::OneOf(AVAILABILITY_VALUES)),
    required("relatedContent", T::RelatedContent, C::None),
    required("created", T::Timestamp, C::None),
    required("updated", T::Timestamp, C::None),
    required("updatedBy", T::Text, C::NonBlank),
    required("published", T::Timestamp, C::None),
    optional("oldNdlaUrl", T::Text, C::None),
    required("supportedLanguages", T::TextList, C::None),
];

const ARTICLE_SUMMARY_FIELDS: &[FieldDef] = &[
    required("id", T::Integer, C::Min(1)),
    required("title", T::Entity("Title"), C::None),
    optional("visualElement", T::Entity("VisualElement"), C::None),
    optional("introduction", T::Entity("Introduction"), C::None),
    optional("metaDescription", T::Entity("MetaDescription"), C::None),
    optional("metaImage", T::Entity("MetaImage"), C::None),
    required("url", T::Text, C::NonBlank),
    required("license", T::Text, C::LicenseCode),
    required("articleType", T::Text, C::OneOf(ARTICLE_TYPES)),
    required("lastUpdated", T::Timestamp, C::None),
    required("supportedLanguages", T::TextList, C::None),
    required("grepCodes", T::TextList, C::Unique),
    required("availability", T::Text, C::OneOf(AVAILABILITY_VALUES)),
];

const COPYRIGHT_FIELDS: &[FieldDef] = &[
    required("license", T::Entity("License"), C::None),
    required("origin", T::Text, C::None),
    required("creators", T::EntityList("Author"), C::AuthorType(AuthorRole::Creators)),
    required("processors", T::EntityList("Author"), C::AuthorType(AuthorRole::Processors)),
    required(
        "rightsholders",
        T::EntityList("Author"),
        C::AuthorType(AuthorRole::Rightsholders),
    ),
    optional("agreementId", T::Integer, C::Min(1)),
    optional("validFrom", T::Timestamp, C::None),
    optional("validTo", T::Timestamp, C::None),
];

const LICENSE_FIELDS: &[FieldDef] = &[
    required("license", T::Text, C::LicenseCode),
    optional("description", T::Text, C::None),
    optional("url", T::Text, C::None),
];

const AUTHOR_FIELDS: &[FieldDef] = &[
    required("type", T::Text, C::NonBlank),
    required("name", T::Text, C::NonBlank),
];

const TAG_FIELDS: &[FieldDef] = &[
    required("tags", T::TextList, C::None),
    required("language", T::Text, C::LanguageTag),
];

const VISUAL_ELEMENT_FIELDS: &[FieldDef] = &[
    required("visualElement", T::Text, C::None),
    required("language", T::Text, C::LanguageTag),
];

const SEARCH_PARAMS_FIELDS: &[FieldDef] = &[
    optional("query", T::Text, C::None),
    optional("language", T::Text, C::LanguageTag),
    optional("license", T::Text, C::LicenseCode),
    optional("page", T::Integer, C::Min(1)),
    optional("pageSize", T::Integer, C::Min(1)),
    required("idList", T::IntegerList, C::Min(1)),
    required("articleTypes", T::TextList, C::OneOf(ARTICLE_TYPES)),
    optional("sort", T::Text, C::OneOf(SORT_VALUES)),
    optional("fallback", T::Boolean, C::None),
    optional("scrollId", T::Text, C::None),
    required("grepCodes", T::TextList, C::None),
];

const SEARCH_RESULT_FIELDS: &[FieldDef] = &[
    required("totalCount", T::Integer, C::Min(0)),
    optional("page", T::Integer, C::Min(1)),
    required("pageSize", T::Integer, C::Min(1)),
    required("language", T::Text, C::None),
    required("results", T::EntityList("ArticleSummary"), C::None),
];

const VALIDATION_ERROR_FIELDS: &[FieldDef] = &[
    required("code", T::Text, C::NonBlank),
    required("description", T::Text, C::None),
    required("messages", T::EntityList("ValidationMessage"), C::None),
    required("occuredAt", T::Timestamp, C::None),
];

const PARTIAL_PUBLISH_FIELDS: &[FieldDef] = &[
    optional("availability", T::Text, C::OneOf(AVAILABILITY_VALUES)),
    optional("grepCodes", T::TextList, C::Unique),
    optional("license", T::Text, C::LicenseCode),
    optional("metaDescription", T::PerLanguage("MetaDescription"), C::None),
    optional("relatedContent", T::RelatedContent, C::None),
    optional("tags", T::PerLanguage("Tag"), C::None),
];

/// Field list of an entity.
pub fn entity_fields(entity: Entity) -> &'static [FieldDef] {
    match entity {
        Entity::Article => ARTICLE_FIELDS,
        Entity::ArticleSummary => ARTICLE_SUMMARY_FIELDS,
        Entity::Copyright => COPYRIGHT_FIELDS,
        Entity::License => LICENSE_FIELDS,
        Entity::Author => AUTHOR_FIELDS,
        Entity::Tag => TAG_FIELDS,
        Entity::VisualElement => VISUAL_ELEMENT_FIELDS,
        Entity::SearchParams => SEARCH_PARAMS_FIELDS,
        Entity::SearchResult => SEARCH_RESULT_FIELDS,
        Entity::ValidationError => VALIDATION_ERROR_FIELDS,
        Entity::PartialPublishPatch => PARTIAL_PUBLISH_FIELDS,
    }
}

/// Definition of one field of an entity.
pub fn field(entity: Entity, name: &str) -> Option<&'static FieldDef> {
    entity_fields(entity).iter().find(|f| f.name == name)
}

/// Enumeration of a `OneOf` field, or an empty slice.
pub fn allowed_values(entity: Entity, name: &str) -> &'static [&'static str] {
    match field(entity, name).map(|f| f.constraint) {
        Some(Constraint::OneOf(values)) => values,
        _ => &[],
    }
}

impl FieldDef {
    /// Check a textual value against this field's constraint.
    ///
    /// Returns a human-readable message on violation.
    pub fn check_text(&self, value: &str, registry: &dyn ContentRegistry) -> Option<String> {
        match self.constraint {
            Constraint::OneOf(values) if !values.contains(&value) => Some(format!(
                "Invalid value '{value}' for {}. Allowed: {}",
                self.name,
                values.join(", ")
            )),
            Constraint::LicenseCode if !registry.is_valid(value) => {
                Some(format!("'{value}' is not a recognized license"))
            }
            Constraint::LanguageTag if !is_valid_language_tag(value) => {
                Some(format!("'{value}' is not a valid language tag"))
            }
            Constraint::AuthorType(role) if !registry.is_valid_for(role, value) => Some(format!(
                "'{value}' is not a valid author type for {}",
                role.field_name()
            )),
            Constraint::NonBlank if value.trim().is_empty() => {
                Some(format!("{} must not be blank", self.name))
            }
            _ => None,
        }
    }

    /// Check a numeric value against a `Min` constraint.
    pub fn check_number(&self, value: i64) -> Option<String> {
        match self.constraint {
            Constraint::Min(min) if value < min => {
                Some(format!("{} must be at least {min}, got {value}", self.name))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// License and author-type registries
// ---------------------------------------------------------------------------

/// Lookup of recognized license codes.
pub trait LicenseRegistry: Send + Sync {
    fn lookup(&self, code: &str) -> Option<License>;

    fn is_valid(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }
}

/// Lookup of recognized author types per role.
pub trait AuthorTypeRegistry: Send + Sync {
    fn is_valid_for(&self, role: AuthorRole, author_type: &str) -> bool;
}

/// Both registries, as passed to validating components.
pub trait ContentRegistry: LicenseRegistry + AuthorTypeRegistry {}

impl<R: LicenseRegistry + AuthorTypeRegistry> ContentRegistry for R {}

/// (code, description, url)
const LICENSES: &[(&str, &str, Option<&str>)] = &[
    (
        "CC-BY-4.0",
        "Creative Commons Attribution 4.0 International",
        Some("https://creativecommons.org/licenses/by/4.0/"),
    ),
    (
        "CC-BY-SA-4.0",
        "Creative Commons Attribution-ShareAlike 4.0 International",
        Some("https://creativecommons.org/licenses/by-sa/4.0/"),
    ),
    (
        "CC-BY-NC-4.0",
        "Creative Commons Attribution-NonCommercial 4.0 International",
        Some("https://creativecommons.org/licenses/by-nc/4.0/"),
    ),
    (
        "CC-BY-ND-4.0",
        "Creative Commons Attribution-NoDerivatives 4.0 International",
        Some("https://creativecommons.org/licenses/by-nd/4.0/"),
    ),
    (
        "CC-BY-NC-SA-4.0",
        "Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International",
        Some("https://creativecommons.org/licenses/by-nc-sa/4.0/"),
    ),
    (
        "CC-BY-NC-ND-4.0",
        "Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International",
        Some("https://creativecommons.org/licenses/by-nc-nd/4.0/"),
    ),
    (
        "CC0-1.0",
        "Creative Commons CC0 1.0 Universal",
        Some("https://creativecommons.org/publicdomain/zero/1.0/"),
    ),
    (
        "PD",
        "Public Domain Mark",
        Some("https://creativecommons.org/about/pdm"),
    ),
    ("COPYRIGHTED", "Copyrighted", None),
    ("N/A", "Not Applicable", None),
];

const CREATOR_TYPES: &[&str] = &[
    "originator",
    "photographer",
    "artist",
    "writer",
    "scriptwriter",
    "reader",
    "translator",
    "director",
    "illustrator",
    "cowriter",
    "composer",
];

const PROCESSOR_TYPES: &[&str] = &["processor", "facilitator", "editorial", "linguistic", "correction"];

const RIGHTSHOLDER_TYPES: &[&str] = &["rightsholder", "publisher", "distributor", "supplier"];

/// Built-in license and author-type registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRegistry;

impl LicenseRegistry for StandardRegistry {
    fn lookup(&self, code: &str) -> Option<License> {
        LICENSES
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(c, description, url)| License {
                license: c.to_string(),
                description: Some(description.to_string()),
                url: url.map(String::from),
            })
    }
}

impl AuthorTypeRegistry for StandardRegistry {
    fn is_valid_for(&self, role: AuthorRole, author_type: &str) -> bool {
        let known = match role {
            AuthorRole::Creators => CREATOR_TYPES,
            AuthorRole::Processors => PROCESSOR_TYPES,
            AuthorRole::Rightsholders => RIGHTSHOLDER_TYPES,
        };
        let lowered = author_type.to_lowercase();
        known.contains(&lowered.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entity_has_fields() {
        for entity in [
            Entity::Article,
            Entity::ArticleSummary,
            Entity::Copyright,
            Entity::License,
            Entity::Author,
            Entity::Tag,
            Entity::VisualElement,
            Entity::SearchParams,
            Entity::SearchResult,
            Entity::ValidationError,
            Entity::PartialPublishPatch,
        ] {
            assert!(!entity_fields(entity).is_empty(), "{entity:?} has no fields");
        }
    }

    #[test]
    fn patch_fields_are_all_optional() {
        assert!(entity_fields(Entity::PartialPublishPatch)
            .iter()
            .all(|f| f.optional));
    }

    #[test]
    fn search_list_fields_are_required_sequences() {
        for name in ["idList", "articleTypes", "grepCodes"] {
            let def = field(Entity::SearchParams, name).unwrap();
            assert!(!def.optional, "{name} should default to empty, not be optional");
        }
    }

    #[test]
    fn allowed_values_for_enumerations() {
        assert_eq!(
            allowed_values(Entity::PartialPublishPatch, "availability"),
            AVAILABILITY_VALUES
        );
        assert_eq!(allowed_values(Entity::SearchParams, "sort"), SORT_VALUES);
        assert!(allowed_values(Entity::SearchParams, "query").is_empty());
        assert!(allowed_values(Entity::SearchParams, "missing").is_empty());
    }

    #[test]
    fn check_text_one_of() {
        let def = field(Entity::Article, "availability").unwrap();
        assert!(def.check_text("student", &StandardRegistry).is_none());
        let msg = def.check_text("parents", &StandardRegistry).unwrap();
        assert!(msg.contains("parents"));
        assert!(msg.contains("everyone, student, teacher"));
    }

    #[test]
    fn check_text_license_code() {
        let def = field(Entity::PartialPublishPatch, "license").unwrap();
        assert!(def.check_text("CC-BY-SA-4.0", &StandardRegistry).is_none());
        assert!(def.check_text("GPL-3.0", &StandardRegistry).is_some());
    }

    #[test]
    fn check_text_language_tag() {
        let def = field(Entity::Tag, "language").unwrap();
        assert!(def.check_text("nn", &StandardRegistry).is_none());
        assert!(def.check_text("Norsk", &StandardRegistry).is_some());
    }

    #[test]
    fn check_number_min() {
        let def = field(Entity::SearchParams, "page").unwrap();
        assert!(def.check_number(1).is_none());
        assert!(def.check_number(0).unwrap().contains("at least 1"));
    }

    #[test]
    fn license_lookup_fills_description() {
        let license = StandardRegistry.lookup("CC-BY-4.0").unwrap();
        assert_eq!(license.license, "CC-BY-4.0");
        assert!(license.description.is_some());
        assert!(license.url.is_some());
        assert!(StandardRegistry.lookup("COPYRIGHTED").unwrap().url.is_none());
        assert!(!StandardRegistry.is_valid("cc-by-4.0"));
    }

    #[test]
    fn author_types_are_role_scoped() {
        let r = StandardRegistry;
        assert!(r.is_valid_for(AuthorRole::Creators, "Writer"));
        assert!(!r.is_valid_for(AuthorRole::Creators, "publisher"));
        assert!(r.is_valid_for(AuthorRole::Rightsholders, "publisher"));
        assert!(r.is_valid_for(AuthorRole::Processors, "editorial"));
    }
}
