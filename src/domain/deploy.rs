//! 部署相关领域模型

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// `KEY=VALUE`，第一个 `=` 为分隔符，值中不允许再出现 `=`
static ENV_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*=[^=]*$").expect("valid env assignment pattern")
});

/// 单条环境变量覆盖（`KEY=VALUE`）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvAssignment {
    pub key: String,
    pub value: String,
}

impl EnvAssignment {
    /// 解析 `KEY=VALUE` 字符串，格式不合法时返回 `None`
    ///
    /// NUL 字节无法出现在进程环境中，同样视为不合法
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains('\0') || !ENV_ASSIGNMENT.is_match(raw) {
            return None;
        }
        let (key, value) = raw.split_once('=')?;
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for EnvAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// 一次部署请求
#[derive(Clone, Debug, Default)]
pub struct DeployRequest {
    /// 服务名称或别名
    pub service: String,
    /// 按调用方顺序排列的 `KEY=VALUE` 覆盖
    pub env: Vec<String>,
}

impl DeployRequest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, assignment: impl Into<String>) -> Self {
        self.env.push(assignment.into());
        self
    }
}

/// 部署结果
///
/// 字段名与对外 JSON 响应一致，不可随意调整
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployResult {
    pub service: String,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}
