// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 从 LLM 自由文本中提取 JSON
//!
//! 所有 LLM 边界统一使用此模块：先去除 markdown 代码围栏，
//! 再定位第一个 `[` 或 `{` 并截取与之平衡的 JSON 值。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[a-zA-Z0-9_-]*\s*(.*?)```").unwrap());

/// 去除 markdown 代码围栏，没有围栏时原样返回
pub fn strip_code_fences(text: &str) -> &str {
    match CODE_FENCE_REGEX.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// 截取第一个平衡的 JSON 值（数组或对象）
///
/// 扫描时会跳过字符串字面量中的括号。找不到平衡结尾时，
/// 退化为截取到最后一个同类闭合字符。
pub fn extract_json_payload(text: &str) -> Option<&str> {
    let body = strip_code_fences(text);
    let start = body.find(['[', '{'])?;
    let (open, close) = if body[start..].starts_with('[') {
        ('[', ']')
    } else {
        ('{', '}')
    };

    if let Some(end) = balanced_end(&body[start..], open, close) {
        return Some(&body[start..start + end]);
    }

    let last = body.rfind(close)?;
    (last > start).then(|| &body[start..=last])
}

fn balanced_end(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// 提取并反序列化 JSON，失败时返回 None
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let payload = extract_json_payload(text)?;
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Failed to parse extracted JSON payload: {}", e);
            None
        }
    }
}

/// 提取并反序列化 JSON，失败时返回调用方提供的默认值
pub fn extract_json_or<T: DeserializeOwned>(text: &str, fallback: T) -> T {
    extract_json(text).unwrap_or(fallback)
}
