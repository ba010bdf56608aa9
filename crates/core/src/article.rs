//! The canonical multilingual article record and its nested value types.

use serde::{Deserialize, Serialize};

use crate::language::{is_valid_language_tag, LanguageField, LanguageMap};
use crate::registry::{self, AuthorRole, ContentRegistry, Entity};
use crate::types::{ArticleId, Revision, Timestamp};
use crate::validation::{ErrorClass, ValidationError, ValidationReport};

// ---------------------------------------------------------------------------
// Per-language values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub title: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub content: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    pub tags: Vec<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Introduction {
    pub introduction: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDescription {
    /// Older clients send this as `content`.
    #[serde(alias = "content")]
    pub meta_description: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaImage {
    pub url: String,
    pub alt: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualElement {
    pub visual_element: String,
    pub language: String,
}

macro_rules! impl_language_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LanguageField for $ty {
                fn language(&self) -> &str {
                    &self.language
                }
            }
        )*
    };
}

impl_language_field!(
    Title,
    Content,
    Tags,
    Introduction,
    MetaDescription,
    MetaImage,
    VisualElement,
);

// ---------------------------------------------------------------------------
// Cross-language values
// ---------------------------------------------------------------------------

/// Who may see an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Everyone,
    Student,
    Teacher,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Everyone => "everyone",
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }

    /// Parse a wire value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "everyone" => Some(Self::Everyone),
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            _ => None,
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "type")]
    pub author_type: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Copyright {
    pub license: License,
    pub origin: String,
    #[serde(default)]
    pub creators: Vec<Author>,
    #[serde(default)]
    pub processors: Vec<Author>,
    #[serde(default)]
    pub rightsholders: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<Timestamp>,
}

impl Copyright {
    /// Check license code, author types per role, and the validity window.
    pub fn validate(&self, registry: &dyn ContentRegistry, report: &mut ValidationReport) {
        if !registry.is_valid(&self.license.license) {
            report.push(
                ErrorClass::UnknownLicense,
                "copyright.license",
                format!("'{}' is not a recognized license", self.license.license),
            );
        }

        for (role, authors) in [
            (AuthorRole::Creators, &self.creators),
            (AuthorRole::Processors, &self.processors),
            (AuthorRole::Rightsholders, &self.rightsholders),
        ] {
            let Some(def) = registry::field(Entity::Copyright, role.field_name()) else {
                continue;
            };
            for author in authors {
                if let Some(msg) = def.check_text(&author.author_type, registry) {
                    report.push(
                        ErrorClass::InvalidArticle,
                        format!("copyright.{}", role.field_name()),
                        msg,
                    );
                }
                if author.name.trim().is_empty() {
                    report.push(
                        ErrorClass::InvalidArticle,
                        format!("copyright.{}", role.field_name()),
                        "Author name must not be blank",
                    );
                }
            }
        }

        if let (Some(from), Some(to)) = (self.valid_from, self.valid_to) {
            report.check(
                from <= to,
                ErrorClass::InvalidArticle,
                "copyright.validFrom",
                "validFrom must not be after validTo",
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredLibrary {
    pub media_type: String,
    pub name: String,
    pub url: String,
}

/// An entry of `relatedContent`: either a reference to another article or
/// an explicit external link.
///
/// On the wire a reference is a bare number and a link is `{title, url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedContent {
    Reference(ArticleId),
    Link { title: String, url: String },
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// The canonical, language-scoped unit of content.
///
/// `supported_languages` is derived from the per-language fields. It is
/// recomputed on deserialization and by [`Article::refresh_supported_languages`];
/// any value supplied on the wire is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ArticleDocument")]
pub struct Article {
    pub id: ArticleId,
    pub revision: Revision,
    pub title: LanguageMap<Title>,
    pub content: LanguageMap<Content>,
    pub tags: LanguageMap<Tags>,
    pub introduction: LanguageMap<Introduction>,
    pub meta_description: LanguageMap<MetaDescription>,
    pub meta_image: LanguageMap<MetaImage>,
    pub visual_element: LanguageMap<VisualElement>,
    pub copyright: Copyright,
    pub required_libraries: Vec<RequiredLibrary>,
    pub article_type: String,
    pub grep_codes: Vec<String>,
    pub concept_ids: Vec<i64>,
    pub availability: Availability,
    pub related_content: Vec<RelatedContent>,
    pub created: Timestamp,
    pub updated: Timestamp,
    pub updated_by: String,
    pub published: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_ndla_url: Option<String>,
    supported_languages: Vec<String>,
}

/// Wire shape accepted when deserializing an [`Article`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleDocument {
    id: ArticleId,
    #[serde(default = "first_revision")]
    revision: Revision,
    title: LanguageMap<Title>,
    content: LanguageMap<Content>,
    #[serde(default)]
    tags: LanguageMap<Tags>,
    #[serde(default)]
    introduction: LanguageMap<Introduction>,
    #[serde(default)]
    meta_description: LanguageMap<MetaDescription>,
    #[serde(default)]
    meta_image: LanguageMap<MetaImage>,
    #[serde(default)]
    visual_element: LanguageMap<VisualElement>,
    copyright: Copyright,
    #[serde(default)]
    required_libraries: Vec<RequiredLibrary>,
    article_type: String,
    #[serde(default)]
    grep_codes: Vec<String>,
    #[serde(default)]
    concept_ids: Vec<i64>,
    #[serde(default)]
    availability: Availability,
    #[serde(default)]
    related_content: Vec<RelatedContent>,
    created: Timestamp,
    updated: Timestamp,
    updated_by: String,
    published: Timestamp,
    #[serde(default)]
    old_ndla_url: Option<String>,
}

fn first_revision() -> Revision {
    1
}

impl From<ArticleDocument> for Article {
    fn from(doc: ArticleDocument) -> Self {
        let mut article = Article {
            id: doc.id,
            revision: doc.revision,
            title: doc.title,
            content: doc.content,
            tags: doc.tags,
            introduction: doc.introduction,
            meta_description: doc.meta_description,
            meta_image: doc.meta_image,
            visual_element: doc.visual_element,
            copyright: doc.copyright,
            required_libraries: doc.required_libraries,
            article_type: doc.article_type,
            grep_codes: doc.grep_codes,
            concept_ids: doc.concept_ids,
            availability: doc.availability,
            related_content: doc.related_content,
            created: doc.created,
            updated: doc.updated,
            updated_by: doc.updated_by,
            published: doc.published,
            old_ndla_url: doc.old_ndla_url,
            supported_languages: Vec::new(),
        };
        article.refresh_supported_languages();
        article
    }
}

impl Article {
    /// Create a new article at revision 1 with one language's title and
    /// content.
    pub fn new(
        id: ArticleId,
        title: Title,
        content: Content,
        copyright: Copyright,
        article_type: impl Into<String>,
        updated_by: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let mut article = Article {
            id,
            revision: 1,
            title: LanguageMap::from_entries([title]),
            content: LanguageMap::from_entries([content]),
            tags: LanguageMap::new(),
            introduction: LanguageMap::new(),
            meta_description: LanguageMap::new(),
            meta_image: LanguageMap::new(),
            visual_element: LanguageMap::new(),
            copyright,
            required_libraries: Vec::new(),
            article_type: article_type.into(),
            grep_codes: Vec::new(),
            concept_ids: Vec::new(),
            availability: Availability::Everyone,
            related_content: Vec::new(),
            created: now,
            updated: now,
            updated_by: updated_by.into(),
            published: now,
            old_ndla_url: None,
            supported_languages: Vec::new(),
        };
        article.refresh_supported_languages();
        article
    }

    /// Distinct languages across all per-language fields, first-attached
    /// order.
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Recompute supported languages from the per-language fields.
    pub fn compute_supported_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        let all = self
            .title
            .languages()
            .chain(self.content.languages())
            .chain(self.tags.languages())
            .chain(self.introduction.languages())
            .chain(self.meta_description.languages())
            .chain(self.meta_image.languages())
            .chain(self.visual_element.languages());
        for lang in all {
            if !languages.iter().any(|l| l == lang) {
                languages.push(lang.to_string());
            }
        }
        languages
    }

    /// Must be called after mutating any per-language field.
    pub fn refresh_supported_languages(&mut self) {
        self.supported_languages = self.compute_supported_languages();
    }

    /// Whether the article has a title or content in `language`.
    pub fn has_content_in(&self, language: &str) -> bool {
        self.title.contains(language) || self.content.contains(language)
    }

    /// Record a content edit: increments the revision and stamps `updated`.
    pub fn record_edit(&mut self, updated_by: impl Into<String>, now: Timestamp) {
        self.revision += 1;
        self.updated = now;
        self.updated_by = updated_by.into();
        self.refresh_supported_languages();
    }

    /// Validate the article against the data model.
    pub fn validate(&self, registry: &dyn ContentRegistry) -> Result<(), ValidationError> {
        let mut report = ValidationReport::new();
        let class = ErrorClass::InvalidArticle;

        report.check(self.id > 0, class, "id", "id must be a positive integer");
        report.check(self.revision >= 1, class, "revision", "revision must be at least 1");

        let has_complete_language = self.title.languages().any(|l| self.content.contains(l));
        report.check(
            has_complete_language,
            class,
            "title",
            "article must have title and content in at least one language",
        );

        check_language_map(&mut report, "title", &self.title);
        check_language_map(&mut report, "content", &self.content);
        check_language_map(&mut report, "tags", &self.tags);
        check_language_map(&mut report, "introduction", &self.introduction);
        check_language_map(&mut report, "metaDescription", &self.meta_description);
        check_language_map(&mut report, "metaImage", &self.meta_image);
        check_language_map(&mut report, "visualElement", &self.visual_element);

        if let Some(def) = registry::field(Entity::Article, "articleType") {
            if let Some(msg) = def.check_text(&self.article_type, registry) {
                report.push(class, "articleType", msg);
            }
        }

        self.copyright.validate(registry, &mut report);

        report.into_result(())
    }
}

fn check_language_map<T: LanguageField>(
    report: &mut ValidationReport,
    field: &str,
    map: &LanguageMap<T>,
) {
    for lang in map.languages() {
        if !is_valid_language_tag(lang) {
            report.push(
                ErrorClass::InvalidArticle,
                format!("{field}.language"),
                format!("'{lang}' is not a valid language tag"),
            );
        }
    }
    for lang in map.duplicate_languages() {
        report.push(
            ErrorClass::InvalidArticle,
            format!("{field}.language"),
            format!("language '{lang}' occurs more than once"),
        );
    }
}
