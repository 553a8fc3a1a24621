//! 应用状态

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::{EnvConfig, ServiceRegistry};
use crate::services::Dispatcher;

/// 应用状态
///
/// 启动时构建一次，之后只读，通过 `Arc<AppState>` 在请求间共享
pub struct AppState {
    /// 环境配置
    pub config: EnvConfig,
    /// 部署分发器（持有只读服务注册表）
    pub dispatcher: Dispatcher,
    /// 服务启动时间
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(config: EnvConfig, registry: ServiceRegistry) -> Self {
        tracing::info!(
            services_file = %config.services_file.display(),
            scripts_dir = %config.scripts_dir.display(),
            services = registry.len(),
            "AppState initialized"
        );

        Self {
            config,
            dispatcher: Dispatcher::new(Arc::new(registry)),
            started_at: Utc::now(),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        self.dispatcher.registry()
    }
}
