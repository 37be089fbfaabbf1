// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use linkscout::config::settings::Settings;
use linkscout::domain::services::llm_service::{LlmClient, LlmService};
use linkscout::domain::services::suggestion_assembler::SuggestionAssembler;
use linkscout::domain::services::website_context::WebsiteContextSummarizer;
use linkscout::infrastructure::search::{
    GenerativeSearch, StructuredSearchFactory, StructuredSearchOptions,
};
use linkscout::presentation::routes;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use linkscout::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting linkscout...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    let host: IpAddr = settings.server.host.parse()?;
    linkscout::infrastructure::metrics::init_metrics(host, settings.server.metrics_port);

    // 3. Build HTTP clients, one per upstream so each gets its own timeout
    let search_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.search.request_timeout_secs))
        .build()?;
    let llm_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.llm.request_timeout_secs))
        .build()?;

    // 4. Initialize discovery strategies
    if settings.llm.api_key.is_none() {
        warn!("No LLM API key configured, generative discovery and summaries will fail");
    }
    let llm: Arc<dyn LlmClient> = Arc::new(LlmService::new(
        llm_http,
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        settings.llm.api_base_url.clone(),
    ));
    let structured = Arc::new(StructuredSearchFactory::new(
        search_http,
        StructuredSearchOptions::from(&settings.search),
    ));
    let generative = Arc::new(GenerativeSearch::new(
        llm.clone(),
        settings.suggestions.max_suggestions * 2,
    ));

    // 5. Initialize services
    let assembler = Arc::new(SuggestionAssembler::from_settings(
        &settings, structured, generative,
    ));
    let summarizer = Arc::new(WebsiteContextSummarizer::new(
        llm,
        settings.summarizer.max_concurrency,
    ));
    if settings.search.default_config().is_some() {
        info!("Server-side structured search credentials enabled");
    }

    // 6. Start HTTP server
    let app = routes::routes(assembler, summarizer);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
