// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含链接发现与锚文本匹配的核心业务逻辑：
/// - 域名权威度（domain_authority）：主机名到信誉等级的纯函数分类
/// - 链接校验（link_validator）：拒绝占位符、格式错误与过浅的 URL
/// - 内容匹配（content_matcher）：句子评分与锚文本截取
/// - 主题派生（topic_extractor）：从关键词与正文派生搜索主题
/// - LLM服务（llm_service）：带网页搜索工具的生成调用
/// - 建议组装（suggestion_assembler）：选择策略、筛选、去重与截断
/// - 网站上下文（website_context）：并发生成网站摘要
pub mod content_matcher;
pub mod domain_authority;
pub mod link_validator;
pub mod llm_service;
pub mod suggestion_assembler;
pub mod topic_extractor;
pub mod website_context;
