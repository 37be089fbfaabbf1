// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::domain::models::domain_tier::DomainTier;
use crate::domain::models::link_suggestion::{ContentMatch, LinkSuggestion};
use crate::domain::models::search_config::SearchConfig;
use crate::domain::models::search_hit::{RawSearchHit, SearchTopic};
use crate::domain::search::discovery::{
    CandidateDiscovery, DiscoveredHit, DiscoveryError, DiscoveryRequest, DiscoveryStrategy,
    StructuredDiscoveryFactory,
};
use crate::domain::services::content_matcher::{ContentMatcher, MatchingOptions};
use crate::domain::services::domain_authority::{domain_matches, host_of, DomainAuthorityClassifier};
use crate::domain::services::link_validator::LinkValidator;
use crate::domain::services::topic_extractor::TopicExtractor;
use crate::utils::text_processing::{html_to_text, split_sentences};

#[derive(Error, Debug)]
pub enum SuggestionError {
    /// 生成式回退调用失败（非解析失败）
    #[error("Fallback discovery failed: {0}")]
    FallbackInvocation(#[source] DiscoveryError),
}

impl SuggestionError {
    pub fn is_quota(&self) -> bool {
        match self {
            SuggestionError::FallbackInvocation(DiscoveryError::QuotaExceeded(_)) => true,
            SuggestionError::FallbackInvocation(DiscoveryError::Llm(e)) => e.is_quota(),
        }
    }
}

/// 建议组装参数
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// 返回建议数上限
    pub max_suggestions: usize,
    /// 结构化路径在最终截断前的上限
    pub structured_cap: usize,
    /// 结构化路径无结果时回退到生成式路径
    pub fallback_on_empty: bool,
    /// 排除的域名（含子域名）
    pub excluded_domains: Vec<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            structured_cap: 8,
            fallback_on_empty: true,
            excluded_domains: Vec::new(),
        }
    }
}

/// 链接建议组装器
///
/// 选择发现策略、逐条筛选候选并匹配锚文本，最后去重截断。
/// 一次调用内部完全顺序执行，不持有可变共享状态。
pub struct SuggestionAssembler {
    options: AssemblerOptions,
    topics: TopicExtractor,
    matcher: ContentMatcher,
    validator: LinkValidator,
    classifier: DomainAuthorityClassifier,
    structured: Arc<dyn StructuredDiscoveryFactory>,
    generative: Arc<dyn CandidateDiscovery>,
    default_config: Option<SearchConfig>,
}

impl SuggestionAssembler {
    /// 使用默认参数创建组装器
    pub fn new(
        structured: Arc<dyn StructuredDiscoveryFactory>,
        generative: Arc<dyn CandidateDiscovery>,
    ) -> Self {
        Self {
            options: AssemblerOptions::default(),
            topics: TopicExtractor::default(),
            matcher: ContentMatcher::default(),
            validator: LinkValidator::default(),
            classifier: DomainAuthorityClassifier::new(),
            structured,
            generative,
            default_config: None,
        }
    }

    /// 根据应用配置创建组装器
    pub fn from_settings(
        settings: &Settings,
        structured: Arc<dyn StructuredDiscoveryFactory>,
        generative: Arc<dyn CandidateDiscovery>,
    ) -> Self {
        let suggestions = &settings.suggestions;
        Self {
            options: AssemblerOptions {
                max_suggestions: suggestions.max_suggestions,
                structured_cap: suggestions.structured_cap,
                fallback_on_empty: suggestions.fallback_on_empty,
                excluded_domains: suggestions.excluded_domains.clone(),
            },
            topics: TopicExtractor::new(suggestions.max_topics),
            matcher: ContentMatcher::new(settings.matching.to_options()),
            validator: LinkValidator::new(suggestions.min_path_segments),
            classifier: DomainAuthorityClassifier::with_additional(
                settings.authority.extra_high_authority.clone(),
                settings.authority.extra_low_quality.clone(),
            ),
            structured,
            generative,
            default_config: settings.search.default_config(),
        }
    }

    pub fn with_options(mut self, options: AssemblerOptions) -> Self {
        self.options = options;
        self
    }

    /// 请求未携带凭据时使用的服务端默认凭据
    pub fn with_default_config(mut self, config: Option<SearchConfig>) -> Self {
        self.default_config = config.filter(SearchConfig::is_complete);
        self
    }

    /// 为正文生成链接建议
    ///
    /// 显式传入的 `config` 优先；未传入时使用服务端默认凭据。凭据不完整时直接走生成式路径。
    /// 空列表是合法结果，只有生成式回退调用失败才返回错误。
    pub async fn suggest(
        &self,
        content: &str,
        keywords: &[String],
        config: Option<&SearchConfig>,
    ) -> Result<Vec<LinkSuggestion>, SuggestionError> {
        let plain_text = html_to_text(content);
        if plain_text.is_empty() {
            info!("Content is empty after normalization, nothing to suggest");
            return Ok(Vec::new());
        }

        let topics = self.topics.extract(content, keywords);
        debug!(
            "Derived {} topics: {:?}",
            topics.len(),
            topics.iter().map(SearchTopic::as_str).collect::<Vec<_>>()
        );
        let request = DiscoveryRequest {
            content,
            keywords,
            topics: &topics,
        };

        let config = match config {
            Some(config) => config.is_complete().then(|| config.clone()),
            None => self.default_config.clone(),
        };

        if let Some(config) = config {
            let structured = self.structured.build(&config);
            match structured.discover(&request).await {
                Ok(hits) => {
                    let mut suggestions = self.assemble(
                        &plain_text,
                        hits,
                        DiscoveryStrategy::Structured,
                        self.options.structured_cap,
                    );
                    suggestions.truncate(self.options.max_suggestions);

                    if !suggestions.is_empty() || !self.options.fallback_on_empty {
                        return Ok(self.finish(suggestions, DiscoveryStrategy::Structured));
                    }
                    info!("Structured search produced no suggestions, falling back to generative search");
                }
                Err(DiscoveryError::QuotaExceeded(reason)) => {
                    warn!(
                        "Structured search quota exceeded ({}), switching to generative search",
                        reason
                    );
                }
                Err(e) => {
                    warn!("Structured search failed: {}, switching to generative search", e);
                }
            }
            counter!("linkscout_strategy_fallbacks_total").increment(1);
        } else {
            debug!("No complete search configuration, using generative search");
        }

        let hits = self
            .generative
            .discover(&request)
            .await
            .map_err(SuggestionError::FallbackInvocation)?;
        let suggestions = self.assemble(
            &plain_text,
            hits,
            DiscoveryStrategy::Generative,
            self.options.max_suggestions,
        );

        Ok(self.finish(suggestions, DiscoveryStrategy::Generative))
    }

    fn finish(
        &self,
        suggestions: Vec<LinkSuggestion>,
        strategy: DiscoveryStrategy,
    ) -> Vec<LinkSuggestion> {
        info!(
            "Returning {} link suggestions from {} discovery",
            suggestions.len(),
            strategy
        );
        counter!("linkscout_suggestions_returned_total").increment(suggestions.len() as u64);
        suggestions
    }

    /// 按发现顺序筛选、匹配、去重，达到 `cap` 即停止
    fn assemble(
        &self,
        plain_text: &str,
        hits: Vec<DiscoveredHit>,
        strategy: DiscoveryStrategy,
        cap: usize,
    ) -> Vec<LinkSuggestion> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut suggestions = Vec::new();

        for DiscoveredHit { topic, hit } in hits {
            if suggestions.len() >= cap {
                break;
            }

            let link = hit.link.trim();
            if let Err(rejection) = self.validator.validate(link) {
                reject(rejection.label(), link);
                continue;
            }
            if self.is_excluded(link) {
                reject("excluded_domain", link);
                continue;
            }
            if strategy == DiscoveryStrategy::Generative
                && self.classifier.classify(link) == DomainTier::LowQuality
            {
                reject("low_quality", link);
                continue;
            }

            let key = normalize_url(link);
            if seen.contains(&key) {
                reject("duplicate", link);
                continue;
            }

            let Some(matched) = self.match_hit(plain_text, &hit, &topic, strategy) else {
                reject("no_anchor", link);
                continue;
            };

            debug!(
                "Accepted {} with anchor '{}' (score {})",
                link, matched.anchor_text, matched.score
            );
            seen.insert(key);
            suggestions.push(build_suggestion(link, &hit, matched, strategy));
        }

        suggestions
    }

    fn match_hit(
        &self,
        plain_text: &str,
        hit: &RawSearchHit,
        topic: &SearchTopic,
        strategy: DiscoveryStrategy,
    ) -> Option<ContentMatch> {
        if strategy == DiscoveryStrategy::Generative {
            if let Some(supplied) = supplied_match(plain_text, hit, self.matcher.options()) {
                return Some(supplied);
            }
        }

        self.matcher
            .match_plain_text(plain_text, hit, topic)
            .or_else(|| self.matcher.title_fallback(hit, topic))
    }

    fn is_excluded(&self, link: &str) -> bool {
        let Some(host) = host_of(link) else {
            return false;
        };
        self.options.excluded_domains.iter().any(|domain| {
            let domain = domain.trim().trim_start_matches("www.").to_lowercase();
            !domain.is_empty() && domain_matches(&host, &domain)
        })
    }
}

/// 生成式结果自带的锚文本与上下文
///
/// 仅当上下文与正文中某个完整句子一致、长度在匹配器的句子范围内且包含锚文本时采用
fn supplied_match(
    plain_text: &str,
    hit: &RawSearchHit,
    options: &MatchingOptions,
) -> Option<ContentMatch> {
    let anchor = hit.title.trim();
    let context = hit.snippet.trim();
    if anchor.is_empty() || context.is_empty() {
        return None;
    }

    let length = context.chars().count();
    if length < options.min_sentence_chars || length > options.max_sentence_chars {
        return None;
    }

    let contains_anchor = context.to_lowercase().contains(&anchor.to_lowercase());
    let whole_sentence = split_sentences(plain_text)
        .into_iter()
        .any(|sentence| sentence.trim() == context);

    (contains_anchor && whole_sentence).then(|| ContentMatch {
        anchor_text: anchor.to_string(),
        context_sentence: context.to_string(),
        score: 0,
    })
}

fn build_suggestion(
    link: &str,
    hit: &RawSearchHit,
    matched: ContentMatch,
    strategy: DiscoveryStrategy,
) -> LinkSuggestion {
    let provided = |value: &str| {
        let value = value.trim();
        (strategy == DiscoveryStrategy::Structured && !value.is_empty()).then(|| value.to_string())
    };

    LinkSuggestion {
        url: link.to_string(),
        anchor_text: matched.anchor_text,
        context: matched.context_sentence,
        title: provided(&hit.title),
        domain: provided(&hit.display_link),
        snippet: provided(&hit.snippet),
    }
}

fn reject(reason: &'static str, link: &str) {
    debug!("Rejected candidate {} ({})", link, reason);
    counter!("linkscout_candidates_rejected_total", "reason" => reason).increment(1);
}

/// 去重用的 URL 规范化：去掉片段与末尾斜杠，忽略大小写
fn normalize_url(url: &str) -> String {
    let mut normalized = url.to_string();
    if let Some(pos) = normalized.find('#') {
        normalized.truncate(pos);
    }
    normalized.trim_end_matches('/').to_lowercase()
}
