use clap::{CommandFactory, Parser, Subcommand};
use recfeed_core::embeddings::FakeEmbeddingProvider;
use recfeed_core::{EmbeddingProvider, RecommenderCore};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

mod commands;
mod config;
mod errors;
mod output;

use commands::{handle_categories_command, handle_episode_command, handle_health_command, handle_scenario_command, load_catalog};
use config::CliConfig;
use errors::WithSuggestion;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "recfeed-cli")]
#[command(about = "Command-line interface for the recfeed-core ranking pipeline")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog fixture path (JSON array of episode records); overrides the config file
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Enable verbose (debug-level) logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session lifecycle against the loaded catalog
    #[command(alias = "run")]
    Scenario {
        /// Path to a scenario JSON file
        scenario: PathBuf,
    },
    /// Distinct categories present in the catalog
    #[command(alias = "cat")]
    Categories,
    /// Look up a single episode by id
    #[command(alias = "ep")]
    Episode {
        id: Uuid,
    },
    /// Catalog size and data-quality fault count
    #[command(alias = "hp")]
    Health,
    /// Generate shell completion scripts
    #[command(alias = "comp")]
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    } else {
        tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
    }

    if let Commands::Completion { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "recfeed-cli", &mut std::io::stdout());
        return Ok(());
    }

    let cli_config = CliConfig::load(cli.config.as_deref())?;
    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| cli_config.catalog_path.clone().map(PathBuf::from))
        .ok_or_else(|| anyhow::anyhow!("no catalog path given; pass --catalog or set catalog_path in the config file"))?;

    let catalog = load_catalog(&catalog_path, cli_config.core.embedding_dimension)?;
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FakeEmbeddingProvider::new(cli_config.core.embedding_dimension));
    let core = RecommenderCore::new(catalog, embedder, cli_config.core)
        .with_suggestion("check the weights and thresholds in your config file against their documented ranges")?;

    match cli.command {
        Commands::Scenario { scenario } => handle_scenario_command(&core, &scenario, cli.format).await,
        Commands::Categories => handle_categories_command(&core, cli.format),
        Commands::Episode { id } => handle_episode_command(&core, id, cli.format),
        Commands::Health => handle_health_command(&core, cli.format),
        Commands::Completion { .. } => unreachable!("completion is handled before config/catalog loading"),
    }
}
