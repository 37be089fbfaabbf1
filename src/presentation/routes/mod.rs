// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::services::suggestion_assembler::SuggestionAssembler;
use crate::domain::services::website_context::WebsiteContextSummarizer;
use crate::presentation::handlers::{suggestion_handler, website_context_handler};

/// 创建应用路由
///
/// # 参数
///
/// * `assembler` - 链接建议组装器
/// * `summarizer` - 网站上下文摘要器
///
/// # 返回值
///
/// 返回配置好的路由，已挂载共享服务与请求追踪层
pub fn routes(
    assembler: Arc<SuggestionAssembler>,
    summarizer: Arc<WebsiteContextSummarizer>,
) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/v1/links/suggest", post(suggestion_handler::suggest_links))
        .route(
            "/v1/websites/context",
            post(website_context_handler::website_context),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(assembler))
                .layer(Extension(summarizer)),
        )
}

/// 健康检查端点
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
