use clap::{Parser, Subcommand};
use pricescout_core::load_app_config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "pricescout")]
#[command(about = "Concurrent multi-vendor price lookup by manufacturer part number")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query every vendor for one MPN.
    Lookup {
        #[arg(long)]
        mpn: String,
        /// Record the results into price history.
        #[arg(long)]
        save: bool,
    },
    /// Query every vendor for each MPN in a list file (one per line).
    Batch {
        #[arg(long)]
        file: String,
        /// Record the results into price history.
        #[arg(long)]
        save: bool,
    },
    /// Print the stored per-vendor price series for one MPN.
    History {
        #[arg(long)]
        mpn: String,
    },
    /// Print overall and per-vendor price averages for one MPN.
    Report {
        #[arg(long)]
        mpn: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Lookup { mpn, save } => commands::lookup(&config, &mpn, save).await,
        Commands::Batch { file, save } => commands::batch(&config, &file, save).await,
        Commands::History { mpn } => commands::history(&config, &mpn).await,
        Commands::Report { mpn } => commands::report(&config, &mpn).await,
    }
}
