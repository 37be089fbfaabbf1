// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 候选发现领域模块
///
/// 定义两种可互换的发现策略共用的接口与错误类型
pub mod discovery;
