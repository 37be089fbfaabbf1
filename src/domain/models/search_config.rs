// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 结构化搜索凭据
///
/// 能力令牌而非领域实体：是否完整决定使用哪种发现策略
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub api_key: String,
    pub search_engine_id: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
            is_enabled: true,
        }
    }

    /// 已启用且密钥与引擎 ID 均非空
    pub fn is_complete(&self) -> bool {
        self.is_enabled
            && !self.api_key.trim().is_empty()
            && !self.search_engine_id.trim().is_empty()
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &"[REDACTED]")
            .field("search_engine_id", &self.search_engine_id)
            .field("is_enabled", &self.is_enabled)
            .finish()
    }
}
