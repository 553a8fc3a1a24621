//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod deploy;
pub mod health;

use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    let server_header = HeaderValue::from_str(&state.config.server_header).unwrap_or_else(|_| {
        tracing::warn!(value = %state.config.server_header, "Invalid server header, using default");
        HeaderValue::from_static(crate::config::env::constants::DEFAULT_SERVER_HEADER)
    });

    Router::new()
        // Deploy
        .merge(deploy::router())
        // Health & Services
        .merge(health::router())
        // Middleware
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::SERVER,
            server_header,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
