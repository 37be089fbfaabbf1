// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use linkscout::domain::models::link_suggestion::LinkSuggestion;
use linkscout::domain::models::search_config::SearchConfig;
use linkscout::domain::search::discovery::DiscoveryError;
use linkscout::domain::services::link_validator::LinkValidator;
use linkscout::domain::services::suggestion_assembler::{AssemblerOptions, SuggestionError};
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{
    assembler, generated_links, keywords, search_response, FakeLlm, FakeReply, ARTICLE,
    NAR_SENTENCE, SEARCH_PATH,
};

const NAR_URL: &str =
    "https://www.nar.realtor/research-and-statistics/housing-statistics/existing-home-sales";
const BLOG_URL: &str = "https://myblog.blogspot.com/2024/05/home-sales-rise.html";
const CENSUS_URL: &str = "https://www.census.gov/construction/nrs/current/index.html";
const CONSTRUCTION_SENTENCE: &str =
    "New construction permits fell sharply in the Midwest during March.";

fn config() -> SearchConfig {
    SearchConfig::new("test-key", "test-cx")
}

/// 所有输出都必须满足的性质
fn assert_properties(suggestions: &[LinkSuggestion], cap: usize) {
    let validator = LinkValidator::default();
    let mut seen = HashSet::new();

    assert!(suggestions.len() <= cap);
    for suggestion in suggestions {
        assert!(validator.is_valid(&suggestion.url), "{}", suggestion.url);
        assert!(
            suggestion
                .context
                .to_lowercase()
                .contains(&suggestion.anchor_text.to_lowercase()),
            "'{}' not in '{}'",
            suggestion.anchor_text,
            suggestion.context
        );
        assert!(seen.insert(suggestion.url.trim_end_matches('/').to_string()));
    }
}

fn generative_reply() -> String {
    let duplicate = format!("{}/", NAR_URL);
    generated_links(&[
        (NAR_URL, "5% increase in home sales", NAR_SENTENCE),
        (BLOG_URL, "home sales", NAR_SENTENCE),
        ("https://example.com/article", "home sales", NAR_SENTENCE),
        ("https://realtor.com/", "home sales", NAR_SENTENCE),
        (duplicate.as_str(), "home sales", NAR_SENTENCE),
        (
            CENSUS_URL,
            "new construction permits",
            "New construction permits fell sharply in the Midwest.",
        ),
    ])
}

async fn mount_search(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn structured_path_screens_and_dedupes() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        200,
        search_response(&[
            (
                "Existing-Home Sales | National Association of REALTORS",
                NAR_URL,
                "Existing-home sales increased in the latest quarter.",
            ),
            ("Realtor.com", "https://realtor.com/", "Homes for sale."),
            ("Home sales rise in spring", BLOG_URL, "Home sales rose this spring."),
            ("Example", "https://example.com/article", "Home sales."),
        ]),
    )
    .await;

    let llm = FakeLlm::text("[]");
    let suggestions = assembler(&server.uri(), llm.clone())
        .suggest(ARTICLE, &keywords(&["home sales"]), Some(&config()))
        .await
        .unwrap();

    assert_properties(&suggestions, 5);
    let urls: Vec<&str> = suggestions.iter().map(|s| s.url.as_str()).collect();
    // The structured path does not consult the domain classifier.
    assert_eq!(urls, vec![NAR_URL, BLOG_URL]);
    assert_eq!(suggestions[0].context, NAR_SENTENCE);
    assert_eq!(
        suggestions[0].title.as_deref(),
        Some("Existing-Home Sales | National Association of REALTORS")
    );
    assert_eq!(suggestions[0].domain.as_deref(), Some("www.nar.realtor"));
    assert!(suggestions[0].snippet.is_some());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn quota_on_structured_path_falls_back_to_generative() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let llm = FakeLlm::text(generative_reply());
    let suggestions = assembler(&server.uri(), llm.clone())
        .suggest(ARTICLE, &keywords(&["home sales"]), Some(&config()))
        .await
        .unwrap();

    assert_eq!(llm.calls(), 1);
    assert_properties(&suggestions, 5);
    let urls: Vec<&str> = suggestions.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec![NAR_URL, CENSUS_URL]);

    assert_eq!(suggestions[0].anchor_text, "5% increase in home sales");
    assert_eq!(suggestions[0].context, NAR_SENTENCE);
    assert!(suggestions[0].title.is_none());
    assert!(suggestions[0].domain.is_none());

    // Unverifiable generated context is replaced by a sentence from the article.
    assert_eq!(suggestions[1].context, CONSTRUCTION_SENTENCE);
}

#[tokio::test]
async fn generative_path_rejects_low_quality_domains() {
    let llm = FakeLlm::text(generative_reply());
    let suggestions = assembler("http://127.0.0.1:9", llm)
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap();

    assert!(suggestions.iter().all(|s| !s.url.contains("blogspot")));
    assert!(suggestions.iter().all(|s| !s.url.contains("example.com")));
    assert!(suggestions.iter().all(|s| s.url != "https://realtor.com/"));
}

#[tokio::test]
async fn empty_structured_run_falls_back_when_enabled() {
    let server = MockServer::start().await;
    mount_search(&server, 200, search_response(&[])).await;

    let llm = FakeLlm::text(generative_reply());
    let suggestions = assembler(&server.uri(), llm.clone())
        .suggest(ARTICLE, &keywords(&["home sales"]), Some(&config()))
        .await
        .unwrap();
    assert_eq!(llm.calls(), 1);
    assert_eq!(suggestions.len(), 2);

    let llm = FakeLlm::text(generative_reply());
    let suggestions = assembler(&server.uri(), llm.clone())
        .with_options(AssemblerOptions {
            fallback_on_empty: false,
            ..AssemblerOptions::default()
        })
        .suggest(ARTICLE, &keywords(&["home sales"]), Some(&config()))
        .await
        .unwrap();
    assert_eq!(llm.calls(), 0);
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn incomplete_config_uses_generative_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let disabled = SearchConfig {
        is_enabled: false,
        ..config()
    };
    let missing_key = SearchConfig {
        api_key: "  ".to_string(),
        ..config()
    };

    for search_config in [None, Some(&disabled), Some(&missing_key)] {
        let llm = FakeLlm::text(generative_reply());
        let suggestions = assembler(&server.uri(), llm.clone())
            .suggest(ARTICLE, &keywords(&["home sales"]), search_config)
            .await
            .unwrap();
        assert_eq!(llm.calls(), 1);
        assert_eq!(suggestions.len(), 2);
    }
}

#[tokio::test]
async fn server_default_config_is_used_when_request_has_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(&[(
            "Existing-Home Sales",
            NAR_URL,
            "Existing-home sales increased in the latest quarter.",
        )])))
        .expect(1..)
        .mount(&server)
        .await;

    let llm = FakeLlm::text("[]");
    let suggestions = assembler(&server.uri(), llm.clone())
        .with_default_config(Some(config()))
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn fallback_failure_is_an_error() {
    let llm = FakeLlm::new(FakeReply::Failure);
    let err = assembler("http://127.0.0.1:9", llm)
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SuggestionError::FallbackInvocation(DiscoveryError::Llm(_))
    ));
    assert!(!err.is_quota());

    let err = assembler("http://127.0.0.1:9", FakeLlm::new(FakeReply::Quota))
        .suggest(ARTICLE, &[], None)
        .await
        .unwrap_err();
    assert!(err.is_quota());
}

#[tokio::test]
async fn unparseable_generative_output_is_an_empty_result() {
    let llm = FakeLlm::text("I'm sorry, I could not find any sources for this article.");
    let suggestions = assembler("http://127.0.0.1:9", llm.clone())
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap();

    assert!(suggestions.is_empty());
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn blank_content_short_circuits() {
    let llm = FakeLlm::text(generative_reply());
    let suggestions = assembler("http://127.0.0.1:9", llm.clone())
        .suggest("<h1>Only a heading</h1>", &keywords(&["home sales"]), None)
        .await
        .unwrap();

    assert!(suggestions.is_empty());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn output_is_capped() {
    let links: Vec<String> = (0..10)
        .map(|i| format!("https://www.census.gov/data/series-{}/home-sales", i))
        .collect();
    let reply = generated_links(
        &links
            .iter()
            .map(|url| (url.as_str(), "home sales", NAR_SENTENCE))
            .collect::<Vec<_>>(),
    );

    let suggestions = assembler("http://127.0.0.1:9", FakeLlm::text(reply))
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 5);
    assert_properties(&suggestions, 5);
    assert_eq!(suggestions[0].url, links[0]);
}

#[tokio::test]
async fn structured_path_applies_its_own_cap() {
    let server = MockServer::start().await;
    let links: Vec<String> = (0..12)
        .map(|i| format!("https://www.census.gov/data/series-{}/home-sales", i))
        .collect();
    let items: Vec<(&str, &str, &str)> = links
        .iter()
        .map(|url| ("Home sales data", url.as_str(), "Home sales figures."))
        .collect();
    mount_search(&server, 200, search_response(&items)).await;

    let suggestions = assembler(&server.uri(), FakeLlm::text("[]"))
        .with_options(AssemblerOptions {
            max_suggestions: 20,
            ..AssemblerOptions::default()
        })
        .suggest(ARTICLE, &keywords(&["home sales"]), Some(&config()))
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 8);
    assert_properties(&suggestions, 8);
}

#[tokio::test]
async fn excluded_domains_are_dropped() {
    let suggestions = assembler("http://127.0.0.1:9", FakeLlm::text(generative_reply()))
        .with_options(AssemblerOptions {
            excluded_domains: vec!["nar.realtor".to_string()],
            ..AssemblerOptions::default()
        })
        .suggest(ARTICLE, &keywords(&["home sales"]), None)
        .await
        .unwrap();

    let urls: Vec<&str> = suggestions.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec![CENSUS_URL]);
}

const ZONING_URL: &str = "https://www.cityplanning.org/boards/zoning-appeals";

/// 只对指定查询返回结果，其余查询得到 404 并被跳过
async fn mount_query(server: &MockServer, query: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn unmatched_hit_uses_title_anchor() {
    let server = MockServer::start().await;
    mount_query(
        &server,
        "zoning variance",
        search_response(&[(
            "Zoning Variance Appeals | City Planning Board",
            ZONING_URL,
            "Appeals are heard monthly. Details follow.",
        )]),
    )
    .await;

    let llm = FakeLlm::text("[]");
    let suggestions = assembler(&server.uri(), llm.clone())
        .suggest(ARTICLE, &keywords(&["zoning variance"]), Some(&config()))
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert_properties(&suggestions, 5);
    assert_eq!(suggestions[0].url, ZONING_URL);
    assert_eq!(suggestions[0].anchor_text, "Zoning Variance Appeals");
    assert_eq!(
        suggestions[0].context,
        "For more on zoning variance, see Zoning Variance Appeals: Appeals are heard monthly."
    );
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn hit_without_usable_title_is_dropped() {
    let server = MockServer::start().await;
    mount_query(
        &server,
        "zoning variance",
        search_response(&[("Ok", ZONING_URL, "Appeals are heard monthly.")]),
    )
    .await;

    let llm = FakeLlm::text("[]");
    let suggestions = assembler(&server.uri(), llm.clone())
        .suggest(ARTICLE, &keywords(&["zoning variance"]), Some(&config()))
        .await
        .unwrap();

    assert!(suggestions.is_empty());
    // 结构化路径没有产出，按默认设置回退到生成式路径
    assert_eq!(llm.calls(), 1);
}
