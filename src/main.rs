use std::path::Path;

use anyhow::Result;
use clap::Parser;
use publist_sync::cli::{run, Cli, Commands};
use publist_sync::{config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Orchestrate runs append to the run log; fetch runs log to stderr so
    // the YAML document on stdout stays clean.
    match &cli.command {
        Commands::Orchestrate { .. } => logging::init_file(Path::new(config::LOG_FILE))?,
        Commands::Fetch { .. } => logging::init_stderr(),
    }
    tracing::info!("CLI arguments parsed, invoking run");

    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
