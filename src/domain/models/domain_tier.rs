// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 域名信誉等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainTier {
    HighAuthority,
    Neutral,
    LowQuality,
}

impl DomainTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainTier::HighAuthority => "high_authority",
            DomainTier::Neutral => "neutral",
            DomainTier::LowQuality => "low_quality",
        }
    }
}
