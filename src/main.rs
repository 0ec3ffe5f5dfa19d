use anyhow::Result;
use clap::Parser;
use dor_admin::cli::{dispatch, Cli};
use dor_admin::config::{DorConfig, DorEnvironment};
use dor_admin::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    DorConfig::load_env_file()?;
    let environment = match cli.environment {
        Some(environment) => environment,
        None => DorEnvironment::from_env()?,
    };

    let mut config = DorConfig::load(environment, cli.config.as_deref())?;
    if cli.json_logs {
        config.logging.json = true;
    }
    init_telemetry(&config.logging)?;
    tracing::debug!(environment = %config.environment, "configuration loaded");

    tokio::runtime::Runtime::new()?.block_on(dispatch(cli.command, config))
}
