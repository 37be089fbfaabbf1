// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use crate::{
    application::dto::suggestion_request::{SuggestLinksRequestDto, SuggestLinksResponseDto},
    domain::services::suggestion_assembler::SuggestionAssembler,
    presentation::errors::AppError,
};

/// 处理链接建议请求
///
/// # 参数
///
/// * `assembler` - 共享的建议组装器
/// * `payload` - 正文、引导关键词与可选的搜索凭据
///
/// # 返回值
///
/// 成功时返回 `{"suggestions": [...]}`，空列表同样是成功结果
///
/// # 错误
///
/// - 请求参数验证失败返回 400
/// - 生成式回退调用失败返回 502，配额耗尽返回 429
pub async fn suggest_links(
    Extension(assembler): Extension<Arc<SuggestionAssembler>>,
    Json(payload): Json<SuggestLinksRequestDto>,
) -> Result<Json<SuggestLinksResponseDto>, AppError> {
    payload.validate()?;

    let suggestions = assembler
        .suggest(
            &payload.content,
            &payload.keywords,
            payload.search_config.as_ref(),
        )
        .await
        .inspect_err(|e| warn!("Link suggestion failed: {}", e))?;

    Ok(Json(SuggestLinksResponseDto { suggestions }))
}
