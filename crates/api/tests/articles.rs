mod common;

use axum::http::StatusCode;

use article_core::article::{Article, Tags, Title};
use common::ARTICLES;

fn bilingual(id: i64) -> Article {
    let mut article = common::article(id, "nb", "Vulkaner");
    article.title.upsert(Title {
        title: "Volcanoes".into(),
        language: "en".into(),
    });
    article.tags.upsert(Tags {
        tags: vec!["geologi".into(), "vulkan".into()],
        language: "nb".into(),
    });
    article.tags.upsert(Tags {
        tags: vec!["geology".into()],
        language: "en".into(),
    });
    article.refresh_supported_languages();
    article
}

// -- single article ---

#[tokio::test]
async fn get_article_in_requested_language() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let response = common::get(app, &format!("{ARTICLES}/7?language=en")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["id"], 7);
    assert_eq!(json["title"]["title"], "Volcanoes");
    assert_eq!(json["title"]["language"], "en");
    assert_eq!(json["tags"]["tags"][0], "geology");
    assert_eq!(json["supportedLanguages"], serde_json::json!(["nb", "en"]));
}

#[tokio::test]
async fn get_article_without_language_uses_first() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let json = common::body_json(common::get(app, &format!("{ARTICLES}/7")).await).await;
    assert_eq!(json["title"]["language"], "nb");
    assert_eq!(json["metaDescription"]["metaDescription"], "");
}

#[tokio::test]
async fn missing_language_is_404_unless_fallback() {
    let app = common::build_test_app(vec![bilingual(7)]);

    let response = common::get(app.clone(), &format!("{ARTICLES}/7?language=de")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");

    let response = common::get(app, &format!("{ARTICLES}/7?language=de&fallback=true")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["title"]["language"], "nb");
}

#[tokio::test]
async fn unknown_article_is_404() {
    let app = common::build_test_app(vec![]);
    let response = common::get(app, &format!("{ARTICLES}/99")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_fallback_flag_is_rejected() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let response = common::get(app, &format!("{ARTICLES}/7?fallback=maybe")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["messages"][0]["field"], "fallback");
}

// -- tag search ---

#[tokio::test]
async fn tag_search_returns_distinct_sorted_tags() {
    let mut other = common::article(8, "nb", "Jordskjelv");
    other.tags.upsert(Tags {
        tags: vec!["geologi".into(), "jordskorpe".into()],
        language: "nb".into(),
    });
    other.refresh_supported_languages();
    let app = common::build_test_app(vec![bilingual(7), other]);

    let response = common::get(app, &format!("{ARTICLES}/tag-search?query=geo&language=nb")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["language"], "nb");
    assert_eq!(json["results"], serde_json::json!(["geologi"]));
}

#[tokio::test]
async fn tag_search_across_all_languages() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let json = common::body_json(
        common::get(app, &format!("{ARTICLES}/tag-search?query=geo")).await,
    )
    .await;
    assert_eq!(json["language"], "*");
    assert_eq!(json["results"], serde_json::json!(["geologi", "geology"]));
}

// -- dump ---

#[tokio::test]
async fn dump_pages_in_id_order() {
    let articles = (1..=5)
        .rev()
        .map(|id| common::article(id, "nb", &format!("Artikkel {id}")))
        .collect();
    let app = common::build_test_app(articles);

    let response = common::get(app, &format!("{ARTICLES}/dump?page=2&pageSize=2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["totalCount"], 5);
    assert_eq!(json["page"], 2);
    let ids: Vec<i64> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 4]);
}

#[tokio::test]
async fn dump_filters_by_language() {
    let app = common::build_test_app(vec![
        bilingual(1),
        common::article(2, "nb", "Bare bokmål"),
    ]);
    let json = common::body_json(common::get(app, &format!("{ARTICLES}/dump?language=en")).await)
        .await;
    assert_eq!(json["totalCount"], 1);
    assert_eq!(json["results"][0]["title"]["title"], "Volcanoes");
}

#[tokio::test]
async fn non_numeric_id_uses_envelope() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let response = common::get(app, &format!("{ARTICLES}/abc")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["code"], "MALFORMED_QUERY");
    assert_eq!(json["messages"][0]["field"], "id");
}

#[tokio::test]
async fn duplicate_dump_parameter_uses_envelope() {
    let app = common::build_test_app(vec![bilingual(7)]);
    let response = common::get(app, &format!("{ARTICLES}/dump?page=1&page=2")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["code"], "MALFORMED_QUERY");
    assert_eq!(json["messages"][0]["field"], "query");
}
