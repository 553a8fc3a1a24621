//! 部署 API
//!
//! `GET /?service=<name>&env=KEY=VALUE&env=...`

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::domain::deploy::{DeployRequest, DeployResult, EnvAssignment};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 创建部署路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(deploy_service))
}

/// 运行 `service` 对应的部署脚本
///
/// GET /
///
/// 脚本返回非零退出码仍然是 200，退出码放在响应体中
async fn deploy_service(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<DeployResult>> {
    let request = parse_deploy_query(params)?;
    let result = state.dispatcher.dispatch(&request).await?;
    Ok(Json(result))
}

/// 从查询参数构建部署请求
///
/// `env` 可重复出现，保持原有顺序；其他未知参数忽略
pub fn parse_deploy_query(params: Vec<(String, String)>) -> ApiResult<DeployRequest> {
    let mut service = None;
    let mut env = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "service" if service.is_none() => service = Some(value),
            "env" => {
                if EnvAssignment::parse(&value).is_none() {
                    return Err(ApiError::unprocessable(format!(
                        "Invalid env value {:?}, expected KEY=VALUE",
                        value
                    )));
                }
                env.push(value);
            }
            _ => {}
        }
    }

    let service =
        service.ok_or_else(|| ApiError::unprocessable("Missing required query parameter 'service'"))?;

    Ok(DeployRequest { service, env })
}
