//! 命令执行器
//!
//! 以 `bash <script>` 运行部署脚本：
//! - 脚本路径作为单个 argv 参数传入，不经过 shell 拼接
//! - 使用调用方组合好的完整环境
//! - stdout/stderr 分离，进程退出后一次性返回

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// 命令执行器
pub struct CommandRunner;

/// 命令执行错误
#[derive(Debug, Error)]
pub enum CommandError {
    /// 命令启动失败
    #[error("Failed to spawn command: {0}")]
    SpawnFailed(#[source] std::io::Error),
    /// 等待命令完成失败
    #[error("Failed to wait for command: {0}")]
    WaitFailed(#[source] std::io::Error),
}

/// 子进程环境，键有序以便调试日志稳定
pub type Environment = BTreeMap<OsString, OsString>;

impl CommandRunner {
    /// 解释器
    pub const SHELL: &'static str = "bash";

    /// 运行脚本并收集全部输出
    ///
    /// 不设超时：脚本挂起时调用方也会一直等待。
    /// 调用方 future 被丢弃时不终止子进程，已开始的部署会运行到结束。
    pub async fn run_script(script: &Path, env: &Environment) -> Result<Output, CommandError> {
        let child = Command::new(Self::SHELL)
            .arg(script)
            .env_clear()
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .map_err(CommandError::SpawnFailed)?;

        child.wait_with_output().await.map_err(CommandError::WaitFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn inherited() -> Environment {
        std::env::vars_os().collect()
    }

    #[tokio::test]
    async fn test_run_script_captures_streams() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("streams.sh");
        fs::write(&script, "echo out\necho err >&2\nexit 7\n").unwrap();

        let output = CommandRunner::run_script(&script, &inherited()).await.unwrap();
        assert_eq!(output.status.code(), Some(7));
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"err\n");
    }

    #[tokio::test]
    async fn test_run_script_uses_given_environment_only() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("env.sh");
        fs::write(&script, "echo \"${ONLY_THIS:-unset}/${CARGO_MANIFEST_DIR:-absent}\"\n").unwrap();

        let mut env = Environment::new();
        env.insert("ONLY_THIS".into(), "set".into());
        if let Some(path) = std::env::var_os("PATH") {
            env.insert("PATH".into(), path);
        }

        let output = CommandRunner::run_script(&script, &env).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "set/absent\n");
    }

    #[tokio::test]
    async fn test_path_with_shell_metacharacters_is_not_interpreted() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("it's $(touch pwned); a.sh");
        fs::write(&script, "echo safe\n").unwrap();

        let output = CommandRunner::run_script(&script, &inherited()).await.unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"safe\n");
        assert!(!dir.path().join("pwned").exists());
    }
}
