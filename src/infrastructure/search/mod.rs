// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 候选发现策略实现
///
/// 结构化搜索提供方（Google Custom Search JSON API 格式）
/// 以及基于带网页搜索工具的生成调用的回退策略
pub mod generative_search;
pub mod structured_search;

pub use generative_search::GenerativeSearch;
pub use structured_search::{StructuredSearchClient, StructuredSearchFactory, StructuredSearchOptions};
