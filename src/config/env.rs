//! 环境变量配置加载

use std::env;
use std::path::PathBuf;
use tracing::warn;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 监听地址
    pub host: String,
    /// 服务监听端口
    pub port: u16,
    /// 部署脚本根目录（相对脚本路径以此为基准）
    pub scripts_dir: PathBuf,
    /// 服务注册文件
    pub services_file: PathBuf,
    /// `Server` 响应头
    pub server_header: String,
    /// 日志文件目录（未设置时仅输出到控制台）
    pub log_dir: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        let scripts_dir = PathBuf::from(constants::DEFAULT_SCRIPTS_DIR);
        Self {
            host: "0.0.0.0".to_string(),
            port: constants::DEFAULT_PORT,
            services_file: scripts_dir.join(constants::SERVICES_FILENAME),
            scripts_dir,
            server_header: constants::DEFAULT_SERVER_HEADER.to_string(),
            log_dir: None,
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源加载配置，空值视为未设置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = var("DEPLOY_HOST").unwrap_or(defaults.host);

        let port = match var("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Invalid PORT, falling back to {}", constants::DEFAULT_PORT);
                constants::DEFAULT_PORT
            }),
            None => defaults.port,
        };

        let scripts_dir = var("DEPLOY_SCRIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.scripts_dir);

        // 默认位于脚本根目录下
        let services_file = var("DEPLOY_SERVICES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| scripts_dir.join(constants::SERVICES_FILENAME));

        let server_header = var("DEPLOY_SERVER_HEADER").unwrap_or(defaults.server_header);

        let log_dir = var("DEPLOY_LOG_DIR").map(PathBuf::from);

        Self {
            host,
            port,
            scripts_dir,
            services_file,
            server_header,
            log_dir,
        }
    }

    /// 监听地址 `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 常量
pub mod constants {
    pub const DEFAULT_PORT: u16 = 8000;

    pub const DEFAULT_SCRIPTS_DIR: &str = "deployment_scripts";

    pub const SERVICES_FILENAME: &str = "deploy_services.yml";

    pub const DEFAULT_SERVER_HEADER: &str = "Deploy Dispatcher";

    pub const LOG_FILENAME: &str = "deploy-dispatcher.log";

    /// 单个日志文件上限（字节）
    pub const LOG_MAX_BYTES: u64 = 1_000_000;

    /// 保留的轮转备份数
    pub const LOG_BACKUP_COUNT: usize = 5;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(
            config.services_file,
            PathBuf::from("deployment_scripts/deploy_services.yml")
        );
        assert_eq!(config.server_header, "Deploy Dispatcher");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_invalid_port_and_scripts_dir() {
        let config = config_from(&[("PORT", "not-a-port"), ("DEPLOY_SCRIPTS_DIR", "/srv/scripts")]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.scripts_dir, PathBuf::from("/srv/scripts"));
        assert_eq!(
            config.services_file,
            PathBuf::from("/srv/scripts/deploy_services.yml")
        );
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("DEPLOY_HOST", "127.0.0.1"),
            ("DEPLOY_SERVICES_FILE", "/etc/deploy/services.yml"),
            ("DEPLOY_LOG_DIR", "/var/log/deploy"),
            ("DEPLOY_SERVER_HEADER", "   "),
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert_eq!(config.services_file, PathBuf::from("/etc/deploy/services.yml"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/deploy")));
        // 空白值视为未设置
        assert_eq!(config.server_header, "Deploy Dispatcher");
    }
}
