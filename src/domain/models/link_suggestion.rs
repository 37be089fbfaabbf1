// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 内容匹配结果
///
/// `anchor_text` 总是 `context_sentence` 的（忽略大小写）子串，
/// `context_sentence` 总是正文纯文本渲染的原样子串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMatch {
    pub anchor_text: String,
    pub context_sentence: String,
    pub score: u32,
}

/// 链接建议，引擎的公开输出单元
///
/// `title`、`domain`、`snippet` 仅在结构化搜索提供方给出时存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSuggestion {
    pub url: String,
    pub anchor_text: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}
