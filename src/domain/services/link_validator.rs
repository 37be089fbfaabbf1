// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// 占位符模式
static PLACEHOLDER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // [URL], [link here], {{url}}, <URL>
        Regex::new(r"\[[^\]]*\]|\{\{?[^}]*\}\}?|<[^>]*>").unwrap(),
        // INSERT_URL_HERE, YOUR-LINK, url here：必须占满整个 URL、主机标签或路径段
        Regex::new(
            r"(?i)(?:^|[/?#=&.:])\s*(?:INSERT[_\s-]*(?:THE[_\s-]*)?(?:URL|LINK)(?:[_\s-]*HERE)?|REPLACE[_\s-]*WITH[_\s-]*(?:THE[_\s-]*)?(?:URL|LINK)|YOUR[_\s-]*(?:URL|LINK)(?:[_\s-]*HERE)?|(?:URL|LINK)[_\s-]*HERE)\s*(?:$|[/?#=&.:])",
        )
        .unwrap(),
        Regex::new(r"(?i)^\s*URL_TO_").unwrap(),
        Regex::new(
            r"(?i)^[a-z][a-z0-9+.-]*://(?:[^/?#@]*@)?(?:[a-z0-9-]+\.)*(?:example\.(?:com|org|net)|your-?website\.[a-z.]+|your-?domain\.[a-z.]+|placeholder\.[a-z.]+)(?::\d+)?(?:[/?#]|$)",
        )
        .unwrap(),
    ]
});

/// 链接被拒绝的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkRejection {
    /// 模板占位符或合成域名
    #[error("URL is a placeholder: {0}")]
    Placeholder(String),
    /// 无法解析或格式不合法
    #[error("URL is malformed: {0}")]
    Malformed(String),
    /// 路径过浅，如站点首页
    #[error("URL is not specific enough: {0}")]
    NotSpecific(String),
}

impl LinkRejection {
    /// 用于日志与指标的短标签
    pub fn label(&self) -> &'static str {
        match self {
            LinkRejection::Placeholder(_) => "placeholder",
            LinkRejection::Malformed(_) => "malformed",
            LinkRejection::NotSpecific(_) => "not_specific",
        }
    }
}

/// 链接结构校验器
///
/// 只做结构检查，不发起任何网络请求：通过校验意味着“结构上可信”，
/// 并不代表链接可访问。
#[derive(Debug, Clone)]
pub struct LinkValidator {
    min_path_segments: usize,
}

impl Default for LinkValidator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl LinkValidator {
    pub fn new(min_path_segments: usize) -> Self {
        Self { min_path_segments }
    }

    /// 依次执行占位符检测、格式校验、具体性检查，遇到第一个失败即返回
    pub fn validate(&self, url: &str) -> Result<Url, LinkRejection> {
        let url = url.trim();

        if is_placeholder(url) {
            return Err(LinkRejection::Placeholder(url.to_string()));
        }

        let parsed = parse_web_url(url)?;

        let segments = parsed
            .path()
            .trim_end_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .count();
        if segments < self.min_path_segments {
            return Err(LinkRejection::NotSpecific(url.to_string()));
        }

        Ok(parsed)
    }

    pub fn is_valid(&self, url: &str) -> bool {
        self.validate(url).is_ok()
    }
}

pub fn is_placeholder(url: &str) -> bool {
    url.is_empty() || PLACEHOLDER_PATTERNS.iter().any(|re| re.is_match(url))
}

fn parse_web_url(url: &str) -> Result<Url, LinkRejection> {
    let malformed = |reason: &str| LinkRejection::Malformed(format!("{} ({})", url, reason));

    let parsed = Url::parse(url).map_err(|e| malformed(&e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(malformed("scheme must be http or https"));
    }

    let host = parsed.host_str().unwrap_or_default();
    if host.is_empty() {
        return Err(malformed("missing host"));
    }
    if !host.contains('.') {
        return Err(malformed("host has no dot"));
    }
    if host.ends_with('.') {
        return Err(malformed("host ends with a dot"));
    }

    Ok(parsed)
}
