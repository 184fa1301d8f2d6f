use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use aventra::{AventraConfig, ItineraryCoordinator, telemetry, web};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "aventra", author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AventraConfig::load_from_path(args.config)?;
    telemetry::init(&config.logging)?;

    let coordinator = Arc::new(
        ItineraryCoordinator::from_config(&config).context("Failed to set up providers")?,
    );
    info!(version = aventra::VERSION, "Starting aventra");

    web::run(&config.server, Arc::clone(&coordinator), shutdown_signal()).await?;
    coordinator.shutdown();
    info!("Shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["aventra"], None)]
    #[case(&["aventra", "--config", "aventra.toml"], Some("aventra.toml"))]
    #[case(&["aventra", "-c", "/etc/aventra.toml"], Some("/etc/aventra.toml"))]
    fn test_config_flag(#[case] argv: &[&str], #[case] expected: Option<&str>) {
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.config, expected.map(PathBuf::from));
    }

    #[test]
    fn test_unknown_argument_is_rejected() {
        assert!(Args::try_parse_from(["aventra", "--port", "80"]).is_err());
    }
}
