// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

/// 安装 Prometheus 导出器并登记计数器说明
///
/// 安装失败（如端口被占用）只记录警告，服务继续运行
pub fn init_metrics(host: IpAddr, port: u16) {
    let addr = SocketAddr::new(host, port);

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(
        "linkscout_candidates_rejected_total",
        "Candidate links dropped during screening, by reason"
    );
    describe_counter!(
        "linkscout_structured_queries_total",
        "Structured search queries issued, by outcome"
    );
    describe_counter!(
        "linkscout_strategy_fallbacks_total",
        "Switches from structured to generative discovery"
    );
    describe_counter!(
        "linkscout_suggestions_returned_total",
        "Link suggestions returned to callers"
    );

    info!("Metrics exporter listening on {}", addr);
}
