// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了一次引擎调用内使用的实体，包括：
/// - 搜索主题与原始命中（search_hit）
/// - 域名信誉等级（domain_tier）
/// - 内容匹配结果与链接建议（link_suggestion）
/// - 结构化搜索凭据（search_config）
///
/// 所有实体在构建后都不再修改。
pub mod domain_tier;
pub mod link_suggestion;
pub mod search_config;
pub mod search_hit;
