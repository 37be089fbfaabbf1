// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use crate::domain::models::search_hit::SearchTopic;
use crate::utils::text_processing::{html_to_text, is_stop_word, split_sentences, tokenize};

/// 用作关键词的最大数量
const MAX_KEYWORD_TOPICS: usize = 3;

/// 主题派生器
///
/// 先取引导关键词，再从正文的重要句子中补充关键短语
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    max_topics: usize,
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TopicExtractor {
    pub fn new(max_topics: usize) -> Self {
        Self {
            max_topics: max_topics.max(1),
        }
    }

    /// 派生搜索主题，结果不超过 `max_topics` 个且不重复
    pub fn extract(&self, content: &str, keywords: &[String]) -> Vec<SearchTopic> {
        let mut topics: Vec<SearchTopic> = Vec::new();

        for keyword in keywords.iter().take(MAX_KEYWORD_TOPICS) {
            if let Some(topic) = SearchTopic::new(keyword) {
                if !contains_topic(&topics, &topic) {
                    topics.push(topic);
                }
            }
        }

        if topics.len() >= self.max_topics {
            topics.truncate(self.max_topics);
            return topics;
        }

        let keyword_tokens: Vec<String> = keywords.iter().flat_map(|k| tokenize(k)).collect();
        for phrase in key_phrases(&html_to_text(content), &keyword_tokens) {
            if topics.len() >= self.max_topics {
                break;
            }
            if let Some(topic) = SearchTopic::new(&phrase) {
                if !contains_topic(&topics, &topic) {
                    topics.push(topic);
                }
            }
        }

        topics
    }
}

fn contains_topic(topics: &[SearchTopic], candidate: &SearchTopic) -> bool {
    topics
        .iter()
        .any(|t| t.as_str().eq_ignore_ascii_case(candidate.as_str()))
}

/// 从纯文本中提取按权重排序的二元短语
///
/// 含数字或关键词的句子视为重要句子，其中出现的短语权重翻倍。
/// 权重相同时按首次出现的顺序排列。
fn key_phrases(plain_text: &str, keyword_tokens: &[String]) -> Vec<String> {
    let mut weights: HashMap<String, (u32, usize)> = HashMap::new();
    let mut order = 0usize;

    for sentence in split_sentences(plain_text) {
        let tokens = tokenize(sentence);
        let important = sentence.chars().any(|c| c.is_ascii_digit())
            || tokens.iter().any(|t| keyword_tokens.contains(t));
        let weight = if important { 2 } else { 1 };

        for pair in tokens.windows(2) {
            if !pair.iter().all(|t| is_phrase_token(t)) || pair[0] == pair[1] {
                continue;
            }
            // 已由关键词覆盖
            if pair.iter().all(|t| keyword_tokens.contains(t)) {
                continue;
            }
            let phrase = pair.join(" ");
            let entry = weights.entry(phrase).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            entry.0 += weight;
        }
    }

    let mut ranked: Vec<(String, (u32, usize))> =
        weights.into_iter().filter(|(_, (w, _))| *w >= 2).collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().map(|(phrase, _)| phrase).collect()
}

fn is_phrase_token(token: &str) -> bool {
    token.chars().count() > 3 && !is_stop_word(token) && !token.chars().all(|c| c.is_ascii_digit())
}
