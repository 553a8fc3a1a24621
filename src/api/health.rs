//! 健康检查与服务列表 API
//!
//! 包含 /health, /services 端点

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::config::env::constants::VERSION;
use crate::domain::service::ServiceDefinition;
use crate::state::AppState;

/// 健康检查响应
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    started_at: String,
    /// 所有可用的名称与别名
    services: Vec<String>,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/services", get(list_services))
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "deploy-dispatcher",
        version: VERSION,
        started_at: state.started_at.to_rfc3339(),
        services: state
            .registry()
            .identifiers()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// 已声明的服务，脚本为解析后的绝对路径
///
/// GET /services
async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<ServiceDefinition>> {
    Json(state.registry().services().to_vec())
}
