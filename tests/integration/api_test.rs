// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use axum_test::TestServer;
use linkscout::domain::services::website_context::WebsiteContextSummarizer;
use linkscout::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;

use super::helpers::{assembler, generated_links, FakeLlm, FakeReply, ARTICLE, NAR_SENTENCE};

fn test_server(llm: Arc<FakeLlm>) -> TestServer {
    let assembler = Arc::new(assembler("http://127.0.0.1:9", llm.clone()));
    let summarizer = Arc::new(WebsiteContextSummarizer::new(llm, 2));
    TestServer::new(routes::routes(assembler, summarizer)).unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let server = test_server(FakeLlm::text("[]"));

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn suggest_links_returns_suggestions() {
    let reply = generated_links(&[(
        "https://www.nar.realtor/research-and-statistics/housing-statistics/existing-home-sales",
        "5% increase in home sales",
        NAR_SENTENCE,
    )]);
    let server = test_server(FakeLlm::text(reply));

    let response = server
        .post("/v1/links/suggest")
        .json(&json!({ "content": ARTICLE, "keywords": ["home sales"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["anchorText"], "5% increase in home sales");
    assert_eq!(suggestions[0]["context"], NAR_SENTENCE);
    assert!(suggestions[0].get("title").is_none());
}

#[tokio::test]
async fn suggest_links_accepts_disabled_search_config() {
    let server = test_server(FakeLlm::text("no links today"));

    let response = server
        .post("/v1/links/suggest")
        .json(&json!({
            "content": ARTICLE,
            "searchConfig": { "apiKey": "key", "searchEngineId": "cx", "isEnabled": false }
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "suggestions": [] }));
}

#[tokio::test]
async fn suggest_links_rejects_blank_content() {
    let server = test_server(FakeLlm::text("[]"));

    let response = server
        .post("/v1/links/suggest")
        .json(&json!({ "content": "   ", "keywords": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggest_links_maps_fallback_failure_to_bad_gateway() {
    let server = test_server(FakeLlm::new(FakeReply::Failure));

    let response = server
        .post("/v1/links/suggest")
        .json(&json!({ "content": ARTICLE }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Fallback discovery failed"));
}

#[tokio::test]
async fn suggest_links_maps_fallback_quota_to_too_many_requests() {
    let server = test_server(FakeLlm::new(FakeReply::Quota));

    let response = server
        .post("/v1/links/suggest")
        .json(&json!({ "content": ARTICLE, "keywords": ["home sales"] }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Fallback discovery failed"));
}

#[tokio::test]
async fn website_context_returns_summaries() {
    let reply = r#"{"summary": "The trade association for realtors.", "topics": ["housing"]}"#;
    let server = test_server(FakeLlm::text(reply));

    let response = server
        .post("/v1/websites/context")
        .json(&json!({ "urls": ["https://www.nar.realtor", "https://www.census.gov"] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let summaries = body["summaries"].as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1]["url"], "https://www.census.gov");
    assert_eq!(summaries[0]["summary"], "The trade association for realtors.");
}

#[tokio::test]
async fn website_context_quota_is_too_many_requests() {
    let server = test_server(FakeLlm::new(FakeReply::Quota));

    let response = server
        .post("/v1/websites/context")
        .json(&json!({ "urls": ["https://www.nar.realtor"] }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn website_context_requires_urls() {
    let server = test_server(FakeLlm::text("{}"));

    let response = server
        .post("/v1/websites/context")
        .json(&json!({ "urls": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
