//! 可部署服务的声明模型（对应 `deploy_services.yml`）

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务注册文件的顶层结构
#[derive(Clone, Debug, Deserialize)]
pub struct ServicesFile {
    pub services: Vec<ServiceDefinition>,
}

/// 单个可部署服务
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// 服务名称，在注册表内唯一
    pub name: String,
    /// 部署脚本路径（绝对路径，或相对于脚本根目录）
    pub script: PathBuf,
    /// 别名，与所有名称/别名共享同一命名空间
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ServiceDefinition {
    /// 名称与全部别名
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
