//! 领域模型模块
//!
//! 纯数据结构，不依赖 axum/tokio

pub mod deploy;
pub mod service;

// Re-exports for convenience
pub use deploy::{DeployRequest, DeployResult, EnvAssignment};
pub use service::{ServiceDefinition, ServicesFile};
