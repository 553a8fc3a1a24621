//! Deploy Dispatcher - 部署脚本分发服务
//!
//! 按服务名称（或别名）查找预先注册的部署脚本并执行，返回 stdout/stderr/退出码

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod services;
pub mod state;

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{EnvConfig, ServiceRegistry};
use crate::state::AppState;

/// 命令行覆盖项，优先级高于环境变量
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub port_override: Option<u16>,
    pub services_file: Option<PathBuf>,
    pub scripts_dir: Option<PathBuf>,
    /// 只校验服务注册文件，不启动 HTTP 服务
    pub check_only: bool,
}

impl RuntimeConfig {
    /// 合并到环境配置
    pub fn apply(&self, mut config: EnvConfig) -> EnvConfig {
        if let Some(port) = self.port_override {
            config.port = port;
        }
        if let Some(ref dir) = self.scripts_dir {
            config.scripts_dir = dir.clone();
        }
        if let Some(ref file) = self.services_file {
            config.services_file = file.clone();
        }
        config
    }
}

/// 加载配置与服务注册表，然后启动 HTTP 服务直到收到退出信号
///
/// 注册表加载失败时直接返回错误，不会开始监听
pub async fn run(runtime: RuntimeConfig) -> anyhow::Result<()> {
    let config = runtime.apply(EnvConfig::from_env());

    logging::init(config.log_dir.as_deref())?;

    let registry = ServiceRegistry::load(&config.services_file, &config.scripts_dir)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load deployment services"))
        .context("Refusing to start with an invalid service registry")?;

    if runtime.check_only {
        for id in registry.identifiers() {
            if let Some(script) = registry.lookup(id) {
                println!("{id} -> {}", script.display());
            }
        }
        return Ok(());
    }

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, registry));
    let app = api::router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Deploy dispatcher listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Deploy dispatcher stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_overrides() {
        let runtime = RuntimeConfig {
            port_override: Some(9999),
            services_file: Some(PathBuf::from("/etc/services.yml")),
            scripts_dir: None,
            check_only: false,
        };
        let config = runtime.apply(EnvConfig::default());
        assert_eq!(config.port, 9999);
        assert_eq!(config.services_file, PathBuf::from("/etc/services.yml"));
        assert_eq!(config.scripts_dir, EnvConfig::default().scripts_dir);
    }

    #[tokio::test]
    async fn test_run_refuses_missing_services_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        let runtime = RuntimeConfig {
            port_override: None,
            services_file: Some(missing.clone()),
            scripts_dir: Some(dir.path().to_path_buf()),
            check_only: true,
        };

        let err = run(runtime).await.unwrap_err();
        match err.downcast_ref::<config::RegistryError>() {
            Some(config::RegistryError::ConfigMissing(path)) => assert_eq!(path, &missing),
            other => panic!("expected ConfigMissing, got {other:?} ({err:#})"),
        }
    }
}
