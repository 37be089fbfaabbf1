// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本规范化模块
//!
//! 提供基于正则的 HTML 转纯文本、句子切分与分词功能。
//!
//! # 限制
//!
//! HTML 清理基于正则表达式，不会修复畸形或未闭合的标签：
//! 未闭合的 `<h2>` 不会被当作标题移除，残缺的 `<` 会原样保留。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h[1-6]\b[^>]*>.*?</h[1-6]\s*>").unwrap());
static SCRIPT_STYLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});
static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static LIST_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•·▪►]|\(?\d{1,3}[.)])\s+").unwrap());

/// 句末缩写，这些词后面的句点不视为句子边界
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "st", "vs", "e.g", "i.e"];

/// 停用词表
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
        "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
        "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
        "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
        "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "more", "most",
        "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
        "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
        "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
        "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
        "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
        "yours", "within", "without", "across", "among", "another", "every", "many", "much",
    ]
    .into_iter()
    .collect()
});

/// 将 HTML 片段转换为纯文本
///
/// 处理顺序：先移除标题元素及其内部文本，再移除 script/style 与注释，
/// 然后剥离其余标签、解码实体并折叠空白。
pub fn html_to_text(html: &str) -> String {
    let without_headings = HEADING_REGEX.replace_all(html, " ");
    let without_scripts = SCRIPT_STYLE_REGEX.replace_all(&without_headings, " ");
    let without_comments = COMMENT_REGEX.replace_all(&without_scripts, " ");
    let without_tags = TAG_REGEX.replace_all(&without_comments, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// 折叠连续空白为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按 `.`、`!`、`?` 切分句子
///
/// 返回值均为 `text` 的子切片。终止符只有在后面紧跟空白或文本结束时才算句子边界，
/// 因此 `5.5%`、`example.com` 不会被切开；单独的序号（如 `1.`）与常见缩写不会单独成句。
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '”' | '’') {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = match chars.peek() {
            Some(&(_, next)) => next.is_whitespace(),
            None => true,
        };
        if !at_boundary {
            continue;
        }

        let fragment = text[start..end].trim();
        if is_ordinal_marker(fragment) || ends_with_abbreviation(fragment) {
            continue;
        }

        if !fragment.is_empty() {
            sentences.push(fragment);
        }
        start = end;
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}

fn is_ordinal_marker(fragment: &str) -> bool {
    let digits = fragment.trim_end_matches(['.', ')']);
    !digits.is_empty() && digits.len() <= 3 && digits.chars().all(|c| c.is_ascii_digit())
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    let last_word = fragment
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase();
    fragment.ends_with('.') && ABBREVIATIONS.contains(&last_word.as_str())
}

/// 判断句子是否像列表项（以项目符号或序号开头）
pub fn is_list_like(sentence: &str) -> bool {
    LIST_MARKER_REGEX.is_match(sentence)
}

/// 小写分词，按非字母数字字符切分
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// 在词边界处截断到 `max_chars` 个字符以内，必要时追加省略号
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(1);
    let hard_cut: String = text.chars().take(budget).collect();
    let cut = match hard_cut.rfind(char::is_whitespace) {
        Some(pos) if pos > budget / 2 => &hard_cut[..pos],
        _ => hard_cut.as_str(),
    };

    format!("{}…", cut.trim_end_matches(|c: char| !c.is_alphanumeric()))
}
