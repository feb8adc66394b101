use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    ConfigCommand, ExportCommand, HistoryCommand, ImportCommand, ItemCommand, ReportCommand,
    SettingsCommand, StockCommand,
};
use config::Config;
use stocklog_core::{ChangeBus, Inventory, KvStore};

#[derive(Parser)]
#[command(name = "stocklog")]
#[command(version)]
#[command(about = "A local-first inventory tracking CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage inventory items
    Item(ItemCommand),

    /// Record stock entries and exits
    Stock(StockCommand),

    /// Show the movement history
    History(HistoryCommand),

    /// Show inventory totals and low-stock items
    Report(ReportCommand),

    /// View and change application settings
    Settings(SettingsCommand),

    /// Export all data to a snapshot file
    Export(ExportCommand),

    /// Replace all data from a snapshot file
    Import(ImportCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stocklog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    // Config inspection must work even when the database cannot be opened.
    if let Commands::Config(cmd) = &cli.command {
        return cmd.run(&config);
    }

    let store = KvStore::open(&config.database_path.value).await?;
    let bus = Arc::new(ChangeBus::new());
    let mut inventory = Inventory::open(&store, &bus).await?;

    match &cli.command {
        Commands::Item(cmd) => cmd.run(&mut inventory).await,
        Commands::Stock(cmd) => cmd.run(&mut inventory).await,
        Commands::History(cmd) => cmd.run(&inventory),
        Commands::Report(cmd) => cmd.run(&inventory),
        Commands::Settings(cmd) => cmd.run(&mut inventory).await,
        Commands::Export(cmd) => cmd.run(&inventory),
        Commands::Import(cmd) => cmd.run(&mut inventory).await,
        Commands::Config(_) => Ok(()), // handled above
    }
}
