//! 配置模块
//!
//! 环境变量解析与服务注册表加载

pub mod env;
pub mod registry;

pub use env::EnvConfig;
pub use registry::{RegistryError, ServiceRegistry};
