// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key not configured")]
    MissingApiKey,
    /// 配额耗尽或被限流，调用方应将其视为权威错误
    #[error("LLM quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Failed to send request to LLM API: {0}")]
    Request(String),
    #[error("LLM API returned error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response format from LLM API")]
    InvalidResponse,
}

impl LlmError {
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }
}

/// 具备网页搜索工具能力的文本生成客户端
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 启用网页搜索工具执行一次生成，返回原始文本输出
    async fn generate_with_web_search(&self, prompt: &str) -> Result<String, LlmError>;
}

/// LLM服务 - 处理与LLM提供商的交互
///
/// # 功能
///
/// 通过 OpenAI 兼容的 Responses 接口发起带 `web_search` 工具的生成调用。
/// 客户端句柄由调用方构建并注入，不使用全局单例。
///
/// # 配置
///
/// 见 `config::settings::LlmSettings`：
/// - `api_key` - LLM API密钥
/// - `model` - 使用的模型名称
/// - `api_base_url` - LLM API基础URL
pub struct LlmService {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

#[async_trait]
impl LlmClient for LlmService {
    async fn generate_with_web_search(&self, prompt: &str) -> Result<String, LlmError> {
        LlmService::generate_with_web_search(self, prompt).await
    }
}

impl LlmService {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        model: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 执行带网页搜索工具的生成调用
    ///
    /// # 错误
    /// * 未配置 API 密钥时返回 `MissingApiKey`
    /// * HTTP 429 或 `insufficient_quota` 时返回 `QuotaExceeded`
    /// * 其他非 2xx 响应返回 `Api`
    pub async fn generate_with_web_search(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let request_body = json!({
            "model": self.model,
            "tools": [{ "type": "web_search" }],
            "input": prompt,
        });

        let url = format!("{}/responses", self.api_base_url);
        debug!("Sending web-search generation request to {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS || error_text.contains("insufficient_quota")
            {
                warn!("LLM quota exceeded: {}", status);
                return Err(LlmError::QuotaExceeded(error_text));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| LlmError::InvalidResponse)?;

        extract_output_text(&body).ok_or(LlmError::InvalidResponse)
    }
}

/// 从 Responses 或 Chat Completions 格式的响应体中取出文本
fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body["output_text"].as_str() {
        return Some(text.to_string());
    }

    if let Some(items) = body["output"].as_array() {
        let text: String = items
            .iter()
            .filter(|item| item["type"] == "message")
            .filter_map(|item| item["content"].as_array())
            .flatten()
            .filter(|part| part["type"] == "output_text")
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            return Some(text);
        }
    }

    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}
