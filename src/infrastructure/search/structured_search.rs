// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::settings::{SearchSettings, DEFAULT_SEARCH_ENDPOINT};
use crate::domain::models::search_config::SearchConfig;
use crate::domain::models::search_hit::{RawSearchHit, SearchTopic};
use crate::domain::search::discovery::{
    CandidateDiscovery, DiscoveredHit, DiscoveryError, DiscoveryRequest, DiscoveryStrategy,
    StructuredDiscoveryFactory,
};
use crate::domain::services::domain_authority::host_of;

/// 配额类错误原因
const QUOTA_REASONS: &[&str] = &[
    "dailyLimitExceeded",
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "RESOURCE_EXHAUSTED",
];

/// 查询变体后缀，第一个变体总是原始主题
const VARIANT_SUFFIXES: &[&str] = &["statistics", "research report"];

/// 结构化搜索查询参数
#[derive(Debug, Clone)]
pub struct StructuredSearchOptions {
    pub endpoint: String,
    /// 每次查询返回的结果数 (num)
    pub results_per_query: u32,
    /// 起始位置 (start)，从 1 开始
    pub start: u32,
    /// 每个主题的查询数（含原始主题），取值 1-3
    pub queries_per_topic: usize,
    pub date_restrict: Option<String>,
    pub site_search: Option<String>,
    pub file_type: Option<String>,
    /// 相邻请求之间的固定间隔
    pub request_delay: Duration,
}

impl Default for StructuredSearchOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            results_per_query: 5,
            start: 1,
            queries_per_topic: 2,
            date_restrict: Some("y2".to_string()),
            site_search: None,
            file_type: None,
            request_delay: Duration::from_millis(250),
        }
    }
}

impl From<&SearchSettings> for StructuredSearchOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            results_per_query: settings.results_per_query.clamp(1, 10),
            start: 1,
            queries_per_topic: settings.queries_per_topic,
            date_restrict: settings.date_restrict.clone(),
            site_search: settings.site_search.clone(),
            file_type: settings.file_type.clone(),
            request_delay: settings.request_delay(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(rename = "displayLink", default)]
    display_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "searchTime", default)]
    search_time: Option<f64>,
}

/// 单次查询的结果
enum QueryOutcome {
    Hits(Vec<RawSearchHit>),
    /// 本次查询失败但不影响后续查询
    Skipped,
}

/// 结构化搜索客户端
///
/// 调用预先限定站点范围的搜索索引（Google Custom Search JSON API 格式）。
/// 请求严格顺序执行，相邻请求之间固定等待 `request_delay`；
/// 一旦遇到配额信号即放弃整个策略。
pub struct StructuredSearchClient {
    http: Client,
    config: SearchConfig,
    options: StructuredSearchOptions,
}

impl StructuredSearchClient {
    pub fn new(http: Client, config: SearchConfig, options: StructuredSearchOptions) -> Self {
        Self {
            http,
            config,
            options,
        }
    }

    /// 为主题生成查询变体
    pub fn query_variants(&self, topic: &SearchTopic) -> Vec<String> {
        let count = self.options.queries_per_topic.clamp(1, 1 + VARIANT_SUFFIXES.len());
        std::iter::once(topic.to_string())
            .chain(
                VARIANT_SUFFIXES
                    .iter()
                    .map(|suffix| format!("{} {}", topic, suffix)),
            )
            .take(count)
            .collect()
    }

    async fn execute_query(&self, query: &str) -> Result<QueryOutcome, DiscoveryError> {
        let mut params: Vec<(&str, String)> = vec![
            ("key", self.config.api_key.clone()),
            ("cx", self.config.search_engine_id.clone()),
            ("q", query.to_string()),
            ("num", self.options.results_per_query.to_string()),
            ("start", self.options.start.to_string()),
        ];
        if let Some(date_restrict) = &self.options.date_restrict {
            params.push(("dateRestrict", date_restrict.clone()));
        }
        if let Some(site) = &self.options.site_search {
            params.push(("siteSearch", site.clone()));
        }
        if let Some(file_type) = &self.options.file_type {
            params.push(("fileType", file_type.clone()));
        }

        let response = match self
            .http
            .get(&self.options.endpoint)
            .query(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Structured search request failed for '{}': {}", query, e);
                counter!("linkscout_structured_queries_total", "outcome" => "network_error")
                    .increment(1);
                return Ok(QueryOutcome::Skipped);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_quota_signal(status, &body) {
                counter!("linkscout_structured_queries_total", "outcome" => "quota").increment(1);
                return Err(DiscoveryError::QuotaExceeded(format!(
                    "status {} for query '{}'",
                    status, query
                )));
            }

            warn!(
                "Structured search returned status {} for '{}', skipping query",
                status, query
            );
            counter!("linkscout_structured_queries_total", "outcome" => "http_error").increment(1);
            return Ok(QueryOutcome::Skipped);
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse structured search response for '{}': {}", query, e);
                counter!("linkscout_structured_queries_total", "outcome" => "parse_error")
                    .increment(1);
                return Ok(QueryOutcome::Skipped);
            }
        };

        if let Some(info) = &parsed.search_information {
            debug!(
                "Query '{}' reported {} total results in {:.2}s",
                query,
                info.total_results.as_deref().unwrap_or("?"),
                info.search_time.unwrap_or_default()
            );
        }

        let hits: Vec<RawSearchHit> = parsed
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let display_link = item
                    .display_link
                    .filter(|d| !d.is_empty())
                    .or_else(|| host_of(&item.link))
                    .unwrap_or_default();
                RawSearchHit {
                    title: item.title,
                    link: item.link,
                    snippet: item.snippet.unwrap_or_default(),
                    display_link,
                }
            })
            .collect();

        counter!("linkscout_structured_queries_total", "outcome" => "ok").increment(1);
        Ok(QueryOutcome::Hits(hits))
    }
}

#[async_trait]
impl CandidateDiscovery for StructuredSearchClient {
    async fn discover(
        &self,
        request: &DiscoveryRequest<'_>,
    ) -> Result<Vec<DiscoveredHit>, DiscoveryError> {
        let mut discovered = Vec::new();
        let mut issued = 0usize;

        for topic in request.topics {
            for query in self.query_variants(topic) {
                if issued > 0 && !self.options.request_delay.is_zero() {
                    tokio::time::sleep(self.options.request_delay).await;
                }
                issued += 1;

                if let QueryOutcome::Hits(hits) = self.execute_query(&query).await? {
                    debug!("Query '{}' returned {} hits", query, hits.len());
                    discovered.extend(hits.into_iter().map(|hit| DiscoveredHit {
                        topic: topic.clone(),
                        hit,
                    }));
                }
            }
        }

        info!(
            "Structured search issued {} queries for {} topics, {} hits",
            issued,
            request.topics.len(),
            discovered.len()
        );
        Ok(discovered)
    }

    fn strategy(&self) -> DiscoveryStrategy {
        DiscoveryStrategy::Structured
    }
}

/// 共享 HTTP 客户端与查询参数，按请求凭据构建客户端
#[derive(Debug, Clone)]
pub struct StructuredSearchFactory {
    http: Client,
    options: StructuredSearchOptions,
}

impl StructuredSearchFactory {
    pub fn new(http: Client, options: StructuredSearchOptions) -> Self {
        Self { http, options }
    }
}

impl StructuredDiscoveryFactory for StructuredSearchFactory {
    fn build(&self, config: &SearchConfig) -> Box<dyn CandidateDiscovery> {
        Box::new(StructuredSearchClient::new(
            self.http.clone(),
            config.clone(),
            self.options.clone(),
        ))
    }
}

/// 判断非 2xx 响应是否为配额信号
///
/// HTTP 429 总是配额信号；其他状态码需要错误体中出现配额类原因。
pub fn is_quota_signal(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }

    let lowered = body.to_lowercase();
    QUOTA_REASONS
        .iter()
        .any(|reason| lowered.contains(&reason.to_lowercase()))
        || lowered.contains("quota")
}
