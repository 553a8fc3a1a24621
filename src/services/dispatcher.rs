//! Deployment dispatch
//!
//! Resolves a service identifier through the registry, runs its script with the
//! composed environment and packages the captured output.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::ServiceRegistry;
use crate::domain::deploy::{DeployRequest, DeployResult, EnvAssignment};
use crate::infra::{CommandError, CommandRunner, Environment};

/// Dispatch failures. A non-zero script exit code is not one of them.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Service '{0}' does not exist.")]
    ServiceNotFound(String),

    #[error("Invalid environment assignment {0:?}, expected KEY=VALUE")]
    InvalidEnvironmentAssignment(String),

    #[error("Failed to run deployment script for '{service}': {source}")]
    SpawnFailed {
        service: String,
        #[source]
        source: CommandError,
    },

    #[error("Process did not return a return code.")]
    NoReturnCode { service: String },
}

/// Runs registered deployment scripts
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, request: &DeployRequest) -> Result<DeployResult, DispatchError> {
        self.deploy(&request.service, &request.env).await
    }

    /// Run the script registered under `service` and wait for it to exit
    pub async fn deploy(&self, service: &str, env: &[String]) -> Result<DeployResult, DispatchError> {
        let script = self.registry.lookup(service).ok_or_else(|| {
            error!(service = %service, "Service does not exist");
            DispatchError::ServiceNotFound(service.to_string())
        })?;

        let overrides = env
            .iter()
            .map(|raw| {
                EnvAssignment::parse(raw)
                    .ok_or_else(|| DispatchError::InvalidEnvironmentAssignment(raw.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let script_env = compose_environment(&overrides);

        info!(service = %service, script = %script.display(), "Running script");
        debug!(service = %service, environment = ?script_env, "Script environment");

        let output = CommandRunner::run_script(script, &script_env)
            .await
            .map_err(|source| {
                error!(service = %service, script = %script.display(), error = %source, "Failed to run script");
                DispatchError::SpawnFailed {
                    service: service.to_string(),
                    source,
                }
            })?;

        let Some(returncode) = output.status.code() else {
            error!(
                service = %service,
                script = %script.display(),
                status = ?output.status,
                "Process did not return a return code"
            );
            return Err(DispatchError::NoReturnCode {
                service: service.to_string(),
            });
        };

        info!(service = %service, returncode, "Script finished");

        Ok(DeployResult {
            service: service.to_string(),
            returncode,
            stdout: decode_output(service, "stdout", output.stdout),
            stderr: decode_output(service, "stderr", output.stderr),
        })
    }
}

/// Current process environment with overrides applied in order, last one wins
fn compose_environment(overrides: &[EnvAssignment]) -> Environment {
    let mut env: Environment = std::env::vars_os().collect();
    for assignment in overrides {
        env.insert(assignment.key.clone().into(), assignment.value.clone().into());
    }
    env
}

/// Invalid UTF-8 is replaced with U+FFFD rather than failing the request
fn decode_output(service: &str, stream: &str, bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!(service = %service, stream, "Script output is not valid UTF-8, replacing invalid bytes");
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}
