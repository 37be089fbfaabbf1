// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::models::link_suggestion::ContentMatch;
use crate::domain::models::search_hit::{RawSearchHit, SearchTopic};
use crate::utils::text_processing::{
    collapse_whitespace, html_to_text, is_list_like, is_stop_word, split_sentences, tokenize,
    truncate_with_ellipsis,
};

static CAPITALIZED_PHRASE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][\w'’-]*(?:\s+(?:of\s+|the\s+|and\s+|for\s+|on\s+)?[A-Z][\w'’-]*)+").unwrap()
});
static TITLE_SEPARATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[|–—\-»·]\s+|\s*::\s*|\s*\|\s*").unwrap());

/// 内容匹配参数
#[derive(Debug, Clone)]
pub struct MatchingOptions {
    /// 句子最短字符数
    pub min_sentence_chars: usize,
    /// 句子最长字符数
    pub max_sentence_chars: usize,
    /// 锚文本最短字符数
    pub min_anchor_chars: usize,
    /// 锚文本最长字符数
    pub max_anchor_chars: usize,
    /// 锚文本理想上限，打平时优先选择低于该长度的较长短语
    pub preferred_anchor_chars: usize,
    /// 标题回退锚文本的截断长度
    pub title_anchor_chars: usize,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            min_sentence_chars: 30,
            max_sentence_chars: 300,
            min_anchor_chars: 10,
            max_anchor_chars: 80,
            preferred_anchor_chars: 60,
            title_anchor_chars: 60,
        }
    }
}

/// 匹配用关键词，单词或多词短语
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    tokens: Vec<String>,
}

impl Keyword {
    fn new(tokens: Vec<String>) -> Self {
        Self {
            text: tokens.join(" "),
            tokens,
        }
    }

    /// 长关键词加 3 分，短关键词加 2 分
    fn weight(&self) -> u32 {
        if self.text.chars().count() > 5 {
            3
        } else {
            2
        }
    }
}

/// 句中的一个词及其在句内的字节区间
struct Word<'a> {
    start: usize,
    end: usize,
    tokens: Vec<String>,
    text: &'a str,
}

/// 单个句子的评分结果
struct SentenceScore<'a> {
    sentence: &'a str,
    score: u32,
    anchor: String,
}

/// 内容匹配器
///
/// 为每个候选链接在正文中找到最相关的句子，并从中截取锚文本
#[derive(Debug, Clone, Default)]
pub struct ContentMatcher {
    options: MatchingOptions,
}

impl ContentMatcher {
    pub fn new(options: MatchingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchingOptions {
        &self.options
    }

    /// 对 HTML 正文进行匹配
    pub fn match_content(
        &self,
        content: &str,
        hit: &RawSearchHit,
        topic: &SearchTopic,
    ) -> Option<ContentMatch> {
        let plain = html_to_text(content);
        self.match_plain_text(&plain, hit, topic)
    }

    /// 对已规范化的纯文本进行匹配
    ///
    /// 返回得分最高的（句子，短语）组合；得分相同时取最先出现的句子。
    /// 没有任何句子得分大于零时返回 None。
    pub fn match_plain_text(
        &self,
        plain_text: &str,
        hit: &RawSearchHit,
        topic: &SearchTopic,
    ) -> Option<ContentMatch> {
        let keywords = build_keywords(hit, topic);
        if keywords.is_empty() {
            return None;
        }

        let mut best: Option<SentenceScore> = None;
        for sentence in split_sentences(plain_text) {
            let length = sentence.chars().count();
            if length < self.options.min_sentence_chars || length > self.options.max_sentence_chars
            {
                continue;
            }

            if let Some(scored) = self.score_sentence(sentence, &keywords) {
                if best.as_ref().map_or(true, |b| scored.score > b.score) {
                    best = Some(scored);
                }
            }
        }

        best.map(|b| ContentMatch {
            anchor_text: b.anchor,
            context_sentence: b.sentence.to_string(),
            score: b.score,
        })
    }

    /// 标题回退：去掉站点名框架，截断标题作为锚文本，并合成一句通用上下文
    pub fn title_fallback(&self, hit: &RawSearchHit, topic: &SearchTopic) -> Option<ContentMatch> {
        let anchor = title_anchor(&hit.title, self.options.title_anchor_chars)?;

        let snippet = html_to_text(&hit.snippet);
        let context = match split_sentences(&snippet).first() {
            Some(lead) => format!("For more on {}, see {}: {}", topic, anchor, lead),
            None => format!("For more on {}, see {}.", topic, anchor),
        };

        Some(ContentMatch {
            anchor_text: anchor,
            context_sentence: context,
            score: 0,
        })
    }

    fn score_sentence<'a>(
        &self,
        sentence: &'a str,
        keywords: &[Keyword],
    ) -> Option<SentenceScore<'a>> {
        let words = split_words(sentence);
        if words.is_empty() {
            return None;
        }

        // Word spans (inclusive) for every keyword that occurs in the sentence.
        let matches: Vec<(&Keyword, Vec<(usize, usize)>)> = keywords
            .iter()
            .map(|k| (k, find_spans(&words, k)))
            .filter(|(_, spans)| !spans.is_empty())
            .collect();
        if matches.is_empty() {
            return None;
        }

        let mut score: u32 = matches.iter().map(|(k, _)| k.weight()).sum();
        if score >= 4 {
            score += 2;
        }
        if !is_list_like(sentence) {
            score += 1;
        }

        let anchor = self
            .best_window(sentence, &words, &matches)
            .or_else(|| self.capitalized_phrase(sentence))
            .unwrap_or_else(|| first_window(sentence, &words, &matches));

        Some(SentenceScore {
            sentence,
            score,
            anchor,
        })
    }

    /// 在所有 2-5 词窗口中选出覆盖关键词最多的短语
    fn best_window(
        &self,
        sentence: &str,
        words: &[Word],
        matches: &[(&Keyword, Vec<(usize, usize)>)],
    ) -> Option<String> {
        let mut seen = HashSet::new();
        let mut best: Option<(usize, (u8, i64), &str)> = None;

        for (_, spans) in matches {
            for &(span_start, span_end) in spans {
                for len in 2..=5usize {
                    let first_start = (span_end + 1).saturating_sub(len);
                    for start in first_start..=span_start {
                        let end = start + len - 1;
                        if end >= words.len() || end < span_end {
                            continue;
                        }

                        let Some((start, end)) = trim_stop_edges(words, start, end) else {
                            continue;
                        };
                        if !seen.insert((start, end)) {
                            continue;
                        }

                        let phrase = trim_phrase(&sentence[words[start].start..words[end].end]);
                        let chars = phrase.chars().count();
                        if chars < self.options.min_anchor_chars
                            || chars > self.options.max_anchor_chars
                        {
                            continue;
                        }

                        let coverage = matches
                            .iter()
                            .filter(|(_, spans)| {
                                spans.iter().any(|&(s, e)| s >= start && e <= end)
                            })
                            .count();
                        let tie_break = if chars < self.options.preferred_anchor_chars {
                            (1, chars as i64)
                        } else {
                            (0, -(chars as i64))
                        };

                        let better = best.as_ref().map_or(true, |(c, t, _)| {
                            coverage > *c || (coverage == *c && tie_break > *t)
                        });
                        if better {
                            best = Some((coverage, tie_break, phrase));
                        }
                    }
                }
            }
        }

        best.map(|(_, _, phrase)| phrase.to_string())
    }

    fn capitalized_phrase(&self, sentence: &str) -> Option<String> {
        CAPITALIZED_PHRASE_REGEX
            .find_iter(sentence)
            .map(|m| trim_phrase(m.as_str()))
            .find(|phrase| {
                let chars = phrase.chars().count();
                chars >= self.options.min_anchor_chars && chars <= self.options.max_anchor_chars
            })
            .map(str::to_string)
    }
}

/// 从候选的标题、摘要与主题构建关键词集合
///
/// 主题分词（以及多词主题整体）、标题中长度大于 3 的词、摘要中长度大于 4 的词，
/// 去除停用词与纯数字。
pub fn build_keywords(hit: &RawSearchHit, topic: &SearchTopic) -> Vec<Keyword> {
    let mut keywords: Vec<Keyword> = Vec::new();
    let mut push = |tokens: Vec<String>| {
        let keyword = Keyword::new(tokens);
        if !keywords.iter().any(|k| k.text == keyword.text) {
            keywords.push(keyword);
        }
    };

    let topic_tokens = tokenize(topic.as_str());
    if topic_tokens.iter().filter(|t| is_meaningful(t, 3)).count() >= 2 {
        push(topic_tokens.clone());
    }
    for token in topic_tokens.iter().filter(|t| is_meaningful(t, 3)) {
        push(vec![token.clone()]);
    }
    for token in tokenize(&hit.title).into_iter().filter(|t| is_meaningful(t, 4)) {
        push(vec![token]);
    }
    for token in tokenize(&hit.snippet).into_iter().filter(|t| is_meaningful(t, 5)) {
        push(vec![token]);
    }

    keywords
}

fn is_meaningful(token: &str, min_len: usize) -> bool {
    token.chars().count() >= min_len
        && !is_stop_word(token)
        && !token.chars().all(|c| c.is_ascii_digit())
}

/// 标题去框架并截断
pub fn title_anchor(title: &str, max_chars: usize) -> Option<String> {
    let title = collapse_whitespace(&html_to_text(title));
    let core = TITLE_SEPARATOR_REGEX
        .split(&title)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .fold("", |longest, segment| {
            if segment.chars().count() > longest.chars().count() {
                segment
            } else {
                longest
            }
        });

    let anchor = truncate_with_ellipsis(core, max_chars);
    (anchor.chars().filter(|c| c.is_alphanumeric()).count() >= 3).then_some(anchor)
}

fn split_words(sentence: &str) -> Vec<Word<'_>> {
    let base = sentence.as_ptr() as usize;
    sentence
        .split_whitespace()
        .map(|text| {
            let start = text.as_ptr() as usize - base;
            Word {
                start,
                end: start + text.len(),
                tokens: tokenize(text),
                text,
            }
        })
        .collect()
}

fn token_matches(word_token: &str, keyword_token: &str) -> bool {
    word_token == keyword_token
        || word_token.strip_suffix('s') == Some(keyword_token)
        || keyword_token.strip_suffix('s') == Some(word_token)
}

fn word_matches(word: &Word, keyword_token: &str) -> bool {
    word.tokens.iter().any(|t| token_matches(t, keyword_token))
}

fn find_spans(words: &[Word], keyword: &Keyword) -> Vec<(usize, usize)> {
    let n = keyword.tokens.len();
    if n == 0 || n > words.len() {
        return Vec::new();
    }

    (0..=words.len() - n)
        .filter(|&i| {
            keyword
                .tokens
                .iter()
                .enumerate()
                .all(|(j, token)| word_matches(&words[i + j], token))
        })
        .map(|i| (i, i + n - 1))
        .collect()
}

fn is_stop_only(word: &Word) -> bool {
    word.tokens.iter().all(|t| is_stop_word(t))
}

/// 去掉窗口两端的停用词，剩余不足两个词时放弃
fn trim_stop_edges(words: &[Word], mut start: usize, mut end: usize) -> Option<(usize, usize)> {
    while start < end && is_stop_only(&words[start]) {
        start += 1;
    }
    while end > start && is_stop_only(&words[end]) {
        end -= 1;
    }
    (end > start).then_some((start, end))
}

/// 去掉短语首尾的标点，保留货币符号与百分号
fn trim_phrase(phrase: &str) -> &str {
    phrase
        .trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '$'))
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '%'))
}

/// 最后的回退：包含第一个匹配词的三词窗口
fn first_window(
    sentence: &str,
    words: &[Word],
    matches: &[(&Keyword, Vec<(usize, usize)>)],
) -> String {
    let position = matches
        .iter()
        .flat_map(|(_, spans)| spans.iter().map(|&(s, _)| s))
        .min()
        .unwrap_or(0);

    let start = position.saturating_sub(1).min(words.len().saturating_sub(3));
    let end = (start + 2).min(words.len() - 1);
    let phrase = trim_phrase(&sentence[words[start].start..words[end].end]);
    if phrase.is_empty() {
        words[position].text.to_string()
    } else {
        phrase.to_string()
    }
}
