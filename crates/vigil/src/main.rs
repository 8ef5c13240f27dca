mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil_api::{PanelClient, TransportConfig};
use vigil_core::{Console, RestGateway};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.global)?;

    let server_url = match cli.global.server.as_deref() {
        Some(raw) => raw.parse().map_err(|_| CliError::Validation {
            message: format!("invalid server URL: {raw}"),
        })?,
        None => config.server_url()?,
    };

    let transport = TransportConfig {
        timeout: cli
            .global
            .timeout
            .map_or_else(|| config.request_timeout(), std::time::Duration::from_secs),
    };
    let client = PanelClient::new(server_url, &transport)?;
    let gateway = Arc::new(RestGateway::new(client));

    let console = Console::new(gateway, config.console_config());
    console.connect().await.map_err(CliError::from)?;

    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &console, &cli.global).await
}

fn load_config(global: &cli::GlobalOpts) -> Result<vigil_config::Config, CliError> {
    match &global.config {
        Some(path) => Ok(vigil_config::load_from(path)?),
        None => Ok(vigil_config::load()?),
    }
}
