//! 服务注册表
//!
//! 启动时从 `deploy_services.yml` 加载一次，之后只读。
//! 名称与别名共享同一命名空间，每个标识符唯一映射到一个已解析的脚本路径。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::service::{ServiceDefinition, ServicesFile};

/// 注册表加载错误
///
/// 任一错误都意味着进程不应开始对外服务
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("deployment services file {0} does not exist")]
    ConfigMissing(PathBuf),

    #[error("invalid deployment services file {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("deployment script {script} for service '{service}' does not exist")]
    ScriptNotFound { service: String, script: PathBuf },

    #[error("deployment script {script} for service '{service}' resolves outside {root}")]
    ScriptOutsideRoot {
        service: String,
        script: PathBuf,
        root: PathBuf,
    },

    #[error("identifier '{0}' is declared more than once")]
    DuplicateIdentifier(String),
}

/// 不可变的服务注册表
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    /// 名称/别名 -> 脚本绝对路径
    lookup: HashMap<String, PathBuf>,
    /// 声明顺序的服务列表，`script` 已替换为解析后的绝对路径
    services: Vec<ServiceDefinition>,
}

impl ServiceRegistry {
    /// 读取并校验服务注册文件
    pub fn load(config_path: &Path, scripts_root: &Path) -> Result<Self, RegistryError> {
        if !config_path.is_file() {
            return Err(RegistryError::ConfigMissing(config_path.to_path_buf()));
        }

        let invalid = |reason: String| RegistryError::ConfigInvalid {
            path: config_path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(config_path).map_err(|e| invalid(e.to_string()))?;
        let file: ServicesFile =
            serde_yaml::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

        let registry = Self::from_definitions(file.services, scripts_root).map_err(|e| match e {
            // from_definitions 不知道文件路径，这里补上
            RegistryError::ConfigInvalid { reason, .. } => invalid(reason),
            other => other,
        })?;

        info!(
            config = %config_path.display(),
            services = registry.services.len(),
            identifiers = registry.lookup.len(),
            "Loaded deployment services"
        );

        Ok(registry)
    }

    /// 由已解析的服务声明构建注册表
    pub fn from_definitions(
        definitions: Vec<ServiceDefinition>,
        scripts_root: &Path,
    ) -> Result<Self, RegistryError> {
        let mut lookup = HashMap::new();
        let mut services = Vec::with_capacity(definitions.len());

        for mut service in definitions {
            if let Some(empty) = service.identifiers().find(|id| id.trim().is_empty()) {
                return Err(RegistryError::ConfigInvalid {
                    path: PathBuf::new(),
                    reason: format!(
                        "service '{}' declares an empty identifier {:?}",
                        service.name, empty
                    ),
                });
            }

            let script = resolve_script(&service, scripts_root)?;
            debug!(service = %service.name, script = %script.display(), "Resolved deployment script");

            for id in service.identifiers() {
                if lookup.insert(id.to_string(), script.clone()).is_some() {
                    return Err(RegistryError::DuplicateIdentifier(id.to_string()));
                }
            }

            service.script = script;
            services.push(service);
        }

        Ok(Self { lookup, services })
    }

    /// 精确、区分大小写的查找
    pub fn lookup(&self, identifier: &str) -> Option<&Path> {
        self.lookup.get(identifier).map(PathBuf::as_path)
    }

    /// 所有名称与别名，已排序
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.lookup.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// 解析脚本路径
///
/// 绝对路径直接解析；相对路径以脚本根目录为基准，且解析后必须仍在根目录内
fn resolve_script(service: &ServiceDefinition, scripts_root: &Path) -> Result<PathBuf, RegistryError> {
    let not_found = || RegistryError::ScriptNotFound {
        service: service.name.clone(),
        script: service.script.clone(),
    };

    if service.script.is_absolute() {
        let resolved = service.script.canonicalize().map_err(|_| not_found())?;
        if !resolved.is_file() {
            return Err(not_found());
        }
        return Ok(resolved);
    }

    let root = scripts_root.canonicalize().map_err(|_| not_found())?;
    let resolved = root
        .join(&service.script)
        .canonicalize()
        .map_err(|_| not_found())?;

    if !resolved.is_file() {
        return Err(not_found());
    }
    if !resolved.starts_with(&root) {
        return Err(RegistryError::ScriptOutsideRoot {
            service: service.name.clone(),
            script: service.script.clone(),
            root,
        });
    }

    Ok(resolved)
}
