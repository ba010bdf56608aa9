//! In-process implementations of the content store and search index.
//!
//! Both sit behind the `article_core::store` traits, so the API can be
//! wired to another backend without touching handlers.

pub mod content;
pub mod index;
pub mod seed;

pub use content::InMemoryContentStore;
pub use index::InMemorySearchIndex;
pub use seed::{load_seed_file, parse_seed, SeedError};

#[cfg(test)]
pub(crate) mod fixtures {
    use article_core::article::{Article, Author, Content, Copyright, License, Title};
    use article_core::types::{ArticleId, Timestamp};
    use chrono::TimeZone;

    pub fn ts(day: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 2, day, 9, 30, 0).unwrap()
    }

    pub fn article(id: ArticleId, language: &str, title: &str) -> Article {
        Article::new(
            id,
            Title {
                title: title.to_string(),
                language: language.to_string(),
            },
            Content {
                content: format!("<section>{title}</section>"),
                language: language.to_string(),
            },
            Copyright {
                license: License {
                    license: "CC-BY-SA-4.0".into(),
                    description: None,
                    url: None,
                },
                origin: String::new(),
                creators: vec![Author {
                    author_type: "writer".into(),
                    name: "Ola Nordmann".into(),
                }],
                processors: vec![],
                rightsholders: vec![],
                agreement_id: None,
                valid_from: None,
                valid_to: None,
            },
            "standard",
            "seed",
            ts(1),
        )
    }
}
