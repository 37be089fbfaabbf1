// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::services::llm_service::{LlmClient, LlmError};
use crate::utils::json_extract::extract_json;

#[derive(Error, Debug)]
pub enum SummarizerError {
    /// 配额耗尽，整批中止
    #[error("Website summarization aborted: {0}")]
    QuotaExceeded(#[source] LlmError),
}

/// 单个网站的上下文摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSummary {
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// 摘要是否为失败时的占位内容
    #[serde(default)]
    pub placeholder: bool,
}

impl WebsiteSummary {
    fn placeholder(url: &str) -> Self {
        Self {
            url: url.to_string(),
            summary: format!("No summary is available for {}.", url),
            topics: Vec::new(),
            placeholder: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryPayload {
    summary: String,
    topics: Vec<String>,
}

/// 网站上下文摘要器
///
/// 为每个 URL 并发发起一次生成请求（同时进行的请求数有上限）。
/// 单条失败只记录日志并以占位摘要代替；配额错误视为权威错误，立即中止整批。
pub struct WebsiteContextSummarizer {
    llm: Arc<dyn LlmClient>,
    max_concurrency: usize,
}

impl WebsiteContextSummarizer {
    pub fn new(llm: Arc<dyn LlmClient>, max_concurrency: usize) -> Self {
        Self {
            llm,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 按输入顺序返回摘要
    ///
    /// 请求按完成顺序收集，任一请求遇到配额错误即中止整批
    pub async fn summarize(&self, urls: &[String]) -> Result<Vec<WebsiteSummary>, SummarizerError> {
        let owned: Vec<(usize, String)> = urls
            .iter()
            .map(|url| url.trim().to_string())
            .enumerate()
            .collect();

        let mut results = stream::iter(owned)
            .map(|(index, url)| async move {
                let outcome = self.summarize_one(&url).await;
                (index, url, outcome)
            })
            .buffer_unordered(self.max_concurrency);

        let mut summaries: Vec<(usize, WebsiteSummary)> = Vec::with_capacity(urls.len());
        while let Some((index, url, outcome)) = results.next().await {
            match outcome {
                Ok(summary) => summaries.push((index, summary)),
                Err(e) if e.is_quota() => {
                    warn!("Quota exceeded while summarizing {}, aborting batch", url);
                    return Err(SummarizerError::QuotaExceeded(e));
                }
                Err(e) => {
                    warn!("Failed to summarize {}: {}", url, e);
                    summaries.push((index, WebsiteSummary::placeholder(&url)));
                }
            }
        }

        summaries.sort_by_key(|(index, _)| *index);
        info!("Summarized {} websites", summaries.len());
        Ok(summaries.into_iter().map(|(_, summary)| summary).collect())
    }

    async fn summarize_one(&self, url: &str) -> Result<WebsiteSummary, LlmError> {
        let text = self.llm.generate_with_web_search(&build_prompt(url)).await?;

        let summary = match extract_json::<SummaryPayload>(&text) {
            Some(payload) if !payload.summary.trim().is_empty() => WebsiteSummary {
                url: url.to_string(),
                summary: payload.summary.trim().to_string(),
                topics: payload
                    .topics
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
                placeholder: false,
            },
            // Free-text answers are still usable as a summary.
            _ if !text.trim().is_empty() && !text.trim_start().starts_with(['{', '[']) => {
                WebsiteSummary {
                    url: url.to_string(),
                    summary: text.trim().to_string(),
                    topics: Vec::new(),
                    placeholder: false,
                }
            }
            _ => {
                warn!("Unusable summary response for {}", url);
                WebsiteSummary::placeholder(url)
            }
        };

        Ok(summary)
    }
}

fn build_prompt(url: &str) -> String {
    format!(
        "Visit {} and describe what this website is about for a content writer who may link to it.\n\
         Respond with ONLY a JSON object of the form \
         {{\"summary\": \"two or three sentences\", \"topics\": [\"topic\", ...]}}. \
         No markdown, no commentary.",
        url
    )
}
