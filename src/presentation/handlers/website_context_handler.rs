// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    application::dto::website_context_request::{
        WebsiteContextRequestDto, WebsiteContextResponseDto,
    },
    domain::services::website_context::WebsiteContextSummarizer,
    presentation::errors::AppError,
};

/// 为一组网站生成上下文摘要
///
/// 单个网站失败时以占位摘要代替；配额耗尽时整批失败并返回 429
pub async fn website_context(
    Extension(summarizer): Extension<Arc<WebsiteContextSummarizer>>,
    Json(payload): Json<WebsiteContextRequestDto>,
) -> Result<Json<WebsiteContextResponseDto>, AppError> {
    payload.validate()?;
    let summaries = summarizer.summarize(&payload.urls).await?;
    Ok(Json(WebsiteContextResponseDto { summaries }))
}
