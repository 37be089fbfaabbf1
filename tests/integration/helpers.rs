// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use linkscout::domain::search::discovery::CandidateDiscovery;
use linkscout::domain::services::llm_service::{LlmClient, LlmError};
use linkscout::domain::services::suggestion_assembler::SuggestionAssembler;
use linkscout::infrastructure::search::{
    GenerativeSearch, StructuredSearchFactory, StructuredSearchOptions,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SEARCH_PATH: &str = "/customsearch/v1";

pub const ARTICLE: &str = "<h1>Spring Housing Report</h1>\
    <p>The National Association of Realtors reports a 5% increase in home sales this quarter. \
    Mortgage rates climbed again this week, according to Freddie Mac data. \
    New construction permits fell sharply in the Midwest during March.</p>";

pub const NAR_SENTENCE: &str =
    "The National Association of Realtors reports a 5% increase in home sales this quarter.";

/// 假 LLM 的预设回复
#[derive(Clone)]
pub enum FakeReply {
    Text(String),
    Quota,
    Failure,
}

/// 内存中的 LLM 假实现，记录调用次数
pub struct FakeLlm {
    reply: FakeReply,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeLlm {
    pub fn new(reply: FakeReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn text(text: impl Into<String>) -> Arc<Self> {
        Self::new(FakeReply::Text(text.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate_with_web_search(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            FakeReply::Text(text) => Ok(text.clone()),
            FakeReply::Quota => Err(LlmError::QuotaExceeded("insufficient_quota".to_string())),
            FakeReply::Failure => Err(LlmError::Api {
                status: 500,
                body: "internal error".to_string(),
            }),
        }
    }
}

/// 生成式搜索返回的 JSON 数组
pub fn generated_links(links: &[(&str, &str, &str)]) -> String {
    let items: Vec<Value> = links
        .iter()
        .map(|(url, anchor, context)| json!({ "url": url, "anchorText": anchor, "context": context }))
        .collect();
    format!("Here are the sources:\n```json\n{}\n```", Value::Array(items))
}

/// 结构化搜索返回的响应体
pub fn search_response(items: &[(&str, &str, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(title, link, snippet)| {
            json!({
                "title": title,
                "link": link,
                "snippet": snippet,
                "displayLink": url_host(link),
            })
        })
        .collect();
    json!({
        "items": items,
        "searchInformation": { "totalResults": "1200", "searchTime": 0.21 }
    })
}

fn url_host(link: &str) -> String {
    link.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}

pub fn search_options(base_uri: &str) -> StructuredSearchOptions {
    StructuredSearchOptions {
        endpoint: format!("{}{}", base_uri, SEARCH_PATH),
        request_delay: Duration::ZERO,
        ..StructuredSearchOptions::default()
    }
}

pub fn assembler(base_uri: &str, llm: Arc<FakeLlm>) -> SuggestionAssembler {
    let structured = Arc::new(StructuredSearchFactory::new(
        reqwest::Client::new(),
        search_options(base_uri),
    ));
    let generative: Arc<dyn CandidateDiscovery> = Arc::new(GenerativeSearch::new(llm, 10));
    SuggestionAssembler::new(structured, generative)
}

pub fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}
