// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括 HTML 规范化与分句、LLM 输出中的 JSON 提取、遥测初始化等功能
pub mod json_extract;
pub mod telemetry;
pub mod text_processing;
