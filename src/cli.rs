use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use crate::client::PureClient;
use crate::config::Config;
use crate::{fetch, orchestrate};

/// CLI for publist-sync: fetch and publish research-group publications.
#[derive(Parser)]
#[clap(
    name = "publist-sync",
    version,
    about = "Fetch publications from the Pure API and publish them as YAML to a website repository"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query the Pure API and emit the publication list as a YAML document
    Fetch {
        /// Output file to (over)write; omit to write the document to stdout
        output: Option<PathBuf>,
    },
    /// Regenerate _data/publist.yml in the target repository, then commit
    /// and push the change
    Orchestrate {
        /// Path to the website repository working tree
        repo: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env();
    config.trace_loaded();
    let client = PureClient::new(&config);

    match cli.command {
        Commands::Fetch { output } => fetch::run(&client, &config, output.as_deref()).await,
        Commands::Orchestrate { repo } => {
            let result = orchestrate::run(&client, &config, &repo).await;
            if let Err(e) = &result {
                error!(error = %e, "Aborted publication update");
            }
            result
        }
    }
}
