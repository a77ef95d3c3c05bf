use clap::Parser;
use deploy_scripts::{cli::Cli, constants::DEFAULT_LOG_FILTER};
use eyre::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let Cli {
        manifest,
        deployments_path,
        command,
    } = Cli::parse();

    command.run(&manifest, &deployments_path).await?;

    Ok(())
}
