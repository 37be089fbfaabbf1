// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::domain::models::search_config::SearchConfig;
use crate::domain::models::search_hit::{RawSearchHit, SearchTopic};
use crate::domain::services::llm_service::LlmError;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// 结构化搜索配额耗尽，整个策略放弃
    #[error("Search provider quota exceeded: {0}")]
    QuotaExceeded(String),
    /// 生成式搜索调用本身失败
    #[error("Generative search call failed: {0}")]
    Llm(#[from] LlmError),
}

/// 发现策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStrategy {
    Structured,
    Generative,
}

impl DiscoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryStrategy::Structured => "structured",
            DiscoveryStrategy::Generative => "generative",
        }
    }
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次发现请求的输入
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryRequest<'a> {
    /// 原始正文（HTML）
    pub content: &'a str,
    /// 引导关键词
    pub keywords: &'a [String],
    /// 已派生的搜索主题
    pub topics: &'a [SearchTopic],
}

/// 带来源主题的搜索命中
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredHit {
    pub topic: SearchTopic,
    pub hit: RawSearchHit,
}

#[async_trait]
pub trait CandidateDiscovery: Send + Sync {
    /// 执行发现，返回按发现顺序排列的命中
    async fn discover(
        &self,
        request: &DiscoveryRequest<'_>,
    ) -> Result<Vec<DiscoveredHit>, DiscoveryError>;

    fn strategy(&self) -> DiscoveryStrategy;
}

/// 按调用方凭据构建结构化发现策略
///
/// 凭据随请求而来，因此每次调用都构建一个新的策略实例
pub trait StructuredDiscoveryFactory: Send + Sync {
    fn build(&self, config: &SearchConfig) -> Box<dyn CandidateDiscovery>;
}
