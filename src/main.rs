//! Deploy Dispatcher - 部署脚本分发服务
//!
//! Usage:
//! - Normal mode: `deploy-dispatcher`
//! - With custom port: `deploy-dispatcher --port 9000`
//! - Validate the services file only: `deploy-dispatcher --check`

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use deploy_dispatcher::RuntimeConfig;

#[derive(Parser, Debug)]
#[command(name = "deploy-dispatcher", version, about = "Run registered deployment scripts over HTTP")]
struct Cli {
    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,

    /// Deployment services file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory for relative script paths
    #[arg(long, value_name = "DIR")]
    scripts_dir: Option<PathBuf>,

    /// Validate the services file and exit
    #[arg(long)]
    check: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        RuntimeConfig {
            port_override: cli.port,
            services_file: cli.config,
            scripts_dir: cli.scripts_dir,
            check_only: cli.check,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let runtime = RuntimeConfig::from(Cli::parse());

    match deploy_dispatcher::run(runtime).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
