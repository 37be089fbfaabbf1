// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：核心业务实体和数据结构
/// - 发现抽象（search）：候选链接发现策略的统一接口
/// - 服务（services）：领域服务和业务规则
///
/// 领域层只依赖抽象接口，具体的搜索提供方实现位于基础设施层。
pub mod models;
pub mod search;
pub mod services;
