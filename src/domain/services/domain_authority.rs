// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

use crate::domain::models::domain_tier::DomainTier;

/// 高权威域名与后缀
const HIGH_AUTHORITY_DOMAINS: &[&str] = &[
    // Government and education suffixes
    ".gov",
    ".edu",
    ".mil",
    ".gov.uk",
    ".ac.uk",
    ".gc.ca",
    ".gov.au",
    // Research and reference
    "nih.gov",
    "ncbi.nlm.nih.gov",
    "nature.com",
    "sciencedirect.com",
    "jstor.org",
    "brookings.edu",
    "pewresearch.org",
    "urban.org",
    "who.int",
    "worldbank.org",
    "imf.org",
    "oecd.org",
    // News and finance
    "reuters.com",
    "apnews.com",
    "bloomberg.com",
    "wsj.com",
    "nytimes.com",
    "washingtonpost.com",
    "ft.com",
    "economist.com",
    "bbc.co.uk",
    "bbc.com",
    "cnbc.com",
    "forbes.com",
    "marketwatch.com",
    "investopedia.com",
    "kiplinger.com",
    "nerdwallet.com",
    "bankrate.com",
    // Real-estate industry authorities
    "nar.realtor",
    "realtor.com",
    "zillow.com",
    "redfin.com",
    "trulia.com",
    "freddiemac.com",
    "fanniemae.com",
    "mba.org",
    "nahb.org",
    "corelogic.com",
    "attomdata.com",
    "inman.com",
    "housingwire.com",
    "realtrends.com",
    "jchs.harvard.edu",
    "consumerfinance.gov",
    "hud.gov",
    "census.gov",
    "fhfa.gov",
];

/// 低质量域名（按域名匹配）
const LOW_QUALITY_DOMAINS: &[&str] = &[
    "blogspot.com",
    "wordpress.com",
    "tumblr.com",
    "wix.com",
    "wixsite.com",
    "weebly.com",
    "squarespace.com",
    "substack.com",
    "medium.com",
    "livejournal.com",
    "reddit.com",
    "quora.com",
    "answers.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "tiktok.com",
    "pinterest.com",
    "linkedin.com",
    "youtube.com",
];

/// 低质量子串（出现在主机名任意位置即命中）
const LOW_QUALITY_SUBSTRINGS: &[&str] = &["scam", "spam", "fake", "forum", "blogspot."];

/// 域名权威度分类器
///
/// 纯函数式分类：先查高权威列表，再查低质量列表，其余为中性。
/// 列表可通过配置扩展，实例构建后不可变。
#[derive(Debug, Clone, Default)]
pub struct DomainAuthorityClassifier {
    extra_high_authority: Vec<String>,
    extra_low_quality: Vec<String>,
}

impl DomainAuthorityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在内置列表之外追加域名
    pub fn with_additional(
        extra_high_authority: impl IntoIterator<Item = String>,
        extra_low_quality: impl IntoIterator<Item = String>,
    ) -> Self {
        let normalize = |d: String| d.trim().trim_start_matches("www.").to_lowercase();
        Self {
            extra_high_authority: extra_high_authority
                .into_iter()
                .map(normalize)
                .filter(|d| !d.is_empty())
                .collect(),
            extra_low_quality: extra_low_quality
                .into_iter()
                .map(normalize)
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// 对 URL（或裸主机名）分类
    pub fn classify(&self, url: &str) -> DomainTier {
        let Some(host) = host_of(url) else {
            return DomainTier::Neutral;
        };

        let high = HIGH_AUTHORITY_DOMAINS
            .iter()
            .copied()
            .chain(self.extra_high_authority.iter().map(String::as_str))
            .any(|entry| domain_matches(&host, entry));
        if high {
            return DomainTier::HighAuthority;
        }

        let low = LOW_QUALITY_DOMAINS
            .iter()
            .copied()
            .chain(self.extra_low_quality.iter().map(String::as_str))
            .any(|entry| domain_matches(&host, entry))
            || LOW_QUALITY_SUBSTRINGS.iter().any(|s| host.contains(s));
        if low {
            return DomainTier::LowQuality;
        }

        DomainTier::Neutral
    }
}

/// 提取小写主机名并去掉 `www.` 前缀
pub fn host_of(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let host = match Url::parse(trimmed) {
        Ok(parsed) => parsed.host_str()?.to_string(),
        // Bare hostnames such as "nar.realtor" are accepted as-is.
        Err(_) => trimmed
            .split(['/', '?', '#', ':'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let host = host.trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    (!host.is_empty()).then_some(host)
}

pub fn domain_matches(host: &str, entry: &str) -> bool {
    if entry.starts_with('.') {
        host.ends_with(entry)
    } else {
        host == entry
            || host
                .strip_suffix(entry)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}
