// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 指标（metrics）：Prometheus 导出器的安装
/// - 搜索（search）：结构化搜索提供方与生成式回退的具体实现
///
/// 基础设施层遵循依赖倒置原则，实现领域层定义的发现接口。
pub mod metrics;
pub mod search;
