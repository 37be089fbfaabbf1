// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::search_hit::{RawSearchHit, SearchTopic};
use crate::domain::search::discovery::{
    CandidateDiscovery, DiscoveredHit, DiscoveryError, DiscoveryRequest, DiscoveryStrategy,
};
use crate::domain::services::domain_authority::host_of;
use crate::domain::services::llm_service::LlmClient;
use crate::utils::json_extract::extract_json_or;
use crate::utils::text_processing::{html_to_text, tokenize, truncate_with_ellipsis};

/// 提示词中正文摘录的最大字符数
const CONTENT_EXCERPT_CHARS: usize = 6000;

/// LLM 返回的单条链接
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratedLink {
    pub url: String,
    #[serde(rename = "anchorText", alias = "anchor_text", alias = "anchor")]
    pub anchor_text: String,
    pub context: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedPayload {
    List(Vec<GeneratedLink>),
    Wrapped { links: Vec<GeneratedLink> },
}

/// 生成式搜索回退
///
/// 通过一次带网页搜索工具的生成调用完成检索，并对自由文本输出做防御性解析：
/// 解析失败时返回空列表而不是报错，只有调用本身失败才向上传播。
pub struct GenerativeSearch {
    llm: Arc<dyn LlmClient>,
    max_results: usize,
}

impl GenerativeSearch {
    pub fn new(llm: Arc<dyn LlmClient>, max_results: usize) -> Self {
        Self {
            llm,
            max_results: max_results.max(1),
        }
    }

    /// 构建提示词
    pub fn build_prompt(&self, request: &DiscoveryRequest<'_>) -> String {
        let excerpt = truncate_with_ellipsis(&html_to_text(request.content), CONTENT_EXCERPT_CHARS);
        let keywords: Vec<&str> = request
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        let topics: Vec<&str> = request.topics.iter().map(SearchTopic::as_str).collect();

        let mut prompt = String::with_capacity(excerpt.len() + 2048);
        prompt.push_str(
            "Search the web for authoritative external sources that support the article below.\n\n",
        );
        if !keywords.is_empty() {
            prompt.push_str(&format!("Guidance keywords: {}\n", keywords.join(", ")));
        }
        if !topics.is_empty() {
            prompt.push_str(&format!("Search topics: {}\n", topics.join("; ")));
        }
        prompt.push_str(&format!(
            "\nRequirements:\n\
             - Return at most {} links.\n\
             - Prefer government, education, research, major news and recognised industry sources.\n\
             - Every url must be a specific, existing article or data page, never a homepage, \
               a search page or a placeholder.\n\
             - anchorText must be a short phrase (2-5 words) copied exactly from the article.\n\
             - context must be the complete sentence from the article that contains anchorText, \
               copied exactly.\n\
             - Respond with ONLY a JSON array of objects with the keys \"url\", \"anchorText\" \
               and \"context\". No markdown, no commentary.\n\n",
            self.max_results
        ));
        prompt.push_str("Article:\n");
        prompt.push_str(&excerpt);
        prompt
    }

    /// 解析 LLM 输出，无法解析时返回空列表
    pub fn parse_response(text: &str) -> Vec<GeneratedLink> {
        let links = match extract_json_or(text, GeneratedPayload::List(Vec::new())) {
            GeneratedPayload::List(links) => links,
            GeneratedPayload::Wrapped { links } => links,
        };

        links
            .into_iter()
            .map(|link| GeneratedLink {
                url: link.url.trim().to_string(),
                anchor_text: link.anchor_text.trim().to_string(),
                context: link.context.trim().to_string(),
            })
            .filter(|link| !link.url.is_empty())
            .collect()
    }
}

#[async_trait]
impl CandidateDiscovery for GenerativeSearch {
    async fn discover(
        &self,
        request: &DiscoveryRequest<'_>,
    ) -> Result<Vec<DiscoveredHit>, DiscoveryError> {
        let prompt = self.build_prompt(request);
        let text = self.llm.generate_with_web_search(&prompt).await?;

        let links = Self::parse_response(&text);
        if links.is_empty() {
            warn!("Generative search returned no parseable links");
        }

        let fallback_topic = request
            .topics
            .first()
            .cloned()
            .or_else(|| request.keywords.iter().find_map(|k| SearchTopic::new(k)));

        let hits: Vec<DiscoveredHit> = links
            .into_iter()
            .take(self.max_results)
            .filter_map(|link| {
                let hit = RawSearchHit {
                    display_link: host_of(&link.url).unwrap_or_default(),
                    title: link.anchor_text,
                    link: link.url,
                    snippet: link.context,
                };
                let topic = closest_topic(request.topics, &hit)
                    .or_else(|| fallback_topic.clone())
                    .or_else(|| SearchTopic::new(&hit.title))?;
                Some(DiscoveredHit { topic, hit })
            })
            .collect();

        info!("Generative search produced {} candidate links", hits.len());
        Ok(hits)
    }

    fn strategy(&self) -> DiscoveryStrategy {
        DiscoveryStrategy::Generative
    }
}

/// 选出与命中文本词汇重叠最多的主题，无重叠时返回 None
fn closest_topic(topics: &[SearchTopic], hit: &RawSearchHit) -> Option<SearchTopic> {
    let hit_tokens: HashSet<String> = tokenize(&format!("{} {}", hit.title, hit.snippet))
        .into_iter()
        .collect();

    topics
        .iter()
        .map(|topic| {
            let overlap = tokenize(topic.as_str())
                .iter()
                .filter(|t| hit_tokens.contains(*t))
                .count();
            (overlap, topic)
        })
        .filter(|(overlap, _)| *overlap > 0)
        .fold(None, |best: Option<(usize, &SearchTopic)>, current| match best {
            Some(b) if b.0 >= current.0 => Some(b),
            _ => Some(current),
        })
        .map(|(_, topic)| topic.clone())
}
