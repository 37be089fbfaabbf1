// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::models::search_config::SearchConfig;
use crate::domain::services::content_matcher::MatchingOptions;

/// 默认结构化搜索端点（Google Custom Search JSON API）
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// 应用程序配置设置
///
/// 包含服务器、结构化搜索、LLM、匹配与建议组装等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 结构化搜索配置
    pub search: SearchSettings,
    /// LLM配置
    pub llm: LlmSettings,
    /// 内容匹配配置
    pub matching: MatchingSettings,
    /// 建议组装配置
    pub suggestions: SuggestionSettings,
    /// 域名权威度配置
    pub authority: AuthoritySettings,
    /// 网站上下文摘要配置
    pub summarizer: SummarizerSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// Prometheus 指标监听端口
    pub metrics_port: u16,
}

/// 结构化搜索配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// 搜索 API 端点
    pub endpoint: String,
    /// 默认 API 密钥（请求未携带凭据时使用）
    pub api_key: Option<String>,
    /// 默认搜索引擎 ID
    pub search_engine_id: Option<String>,
    /// 是否启用默认凭据
    pub enabled: bool,
    /// 每次查询的结果数 (num)
    pub results_per_query: u32,
    /// 每个主题的查询变体数
    pub queries_per_topic: usize,
    /// 时间限制，如 y2 表示近两年
    pub date_restrict: Option<String>,
    /// 站内搜索限制
    pub site_search: Option<String>,
    /// 文件类型限制
    pub file_type: Option<String>,
    /// 相邻请求之间的固定间隔（毫秒）
    pub request_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

/// LLM配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// LLM API密钥
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API基础URL
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

/// 内容匹配配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub min_sentence_chars: usize,
    pub max_sentence_chars: usize,
    pub max_anchor_chars: usize,
}

/// 建议组装配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionSettings {
    /// 返回建议数上限
    pub max_suggestions: usize,
    /// 结构化路径在最终截断前的上限
    pub structured_cap: usize,
    /// 派生主题数上限
    pub max_topics: usize,
    /// URL 路径最少段数
    pub min_path_segments: usize,
    /// 结构化路径无结果时是否回退到生成式路径
    pub fallback_on_empty: bool,
    /// 排除的域名
    #[serde(default)]
    pub excluded_domains: Vec<String>,
}

/// 域名权威度配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthoritySettings {
    #[serde(default)]
    pub extra_high_authority: Vec<String>,
    #[serde(default)]
    pub extra_low_quality: Vec<String>,
}

/// 网站上下文摘要配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerSettings {
    /// 同时进行的请求数上限
    pub max_concurrency: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件与环境变量（前缀 `LINKSCOUT`，分隔符 `__`）加载
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LINKSCOUT").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置，不读取文件与环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default server settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.metrics_port", 9000)?
            // Default structured search settings
            .set_default("search.endpoint", DEFAULT_SEARCH_ENDPOINT)?
            .set_default("search.enabled", false)?
            .set_default("search.results_per_query", 5)?
            .set_default("search.queries_per_topic", 2)?
            .set_default("search.date_restrict", "y2")?
            .set_default("search.request_delay_ms", 250)?
            .set_default("search.request_timeout_secs", 15)?
            // Default LLM settings
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.request_timeout_secs", 60)?
            // Default matching settings
            .set_default("matching.min_sentence_chars", 30)?
            .set_default("matching.max_sentence_chars", 300)?
            .set_default("matching.max_anchor_chars", 80)?
            // Default suggestion settings
            .set_default("suggestions.max_suggestions", 5)?
            .set_default("suggestions.structured_cap", 8)?
            .set_default("suggestions.max_topics", 4)?
            .set_default("suggestions.min_path_segments", 2)?
            .set_default("suggestions.fallback_on_empty", true)?
            .set_default("suggestions.excluded_domains", Vec::<String>::new())?
            // Default authority settings
            .set_default("authority.extra_high_authority", Vec::<String>::new())?
            .set_default("authority.extra_low_quality", Vec::<String>::new())?
            // Default summarizer settings
            .set_default("summarizer.max_concurrency", 4)
    }
}

impl SearchSettings {
    /// 服务端配置的默认凭据，未配置完整时返回 None
    pub fn default_config(&self) -> Option<SearchConfig> {
        let config = SearchConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            search_engine_id: self.search_engine_id.clone().unwrap_or_default(),
            is_enabled: self.enabled,
        };
        config.is_complete().then_some(config)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl MatchingSettings {
    pub fn to_options(&self) -> MatchingOptions {
        MatchingOptions {
            min_sentence_chars: self.min_sentence_chars,
            max_sentence_chars: self.max_sentence_chars,
            max_anchor_chars: self.max_anchor_chars,
            ..MatchingOptions::default()
        }
    }
}
