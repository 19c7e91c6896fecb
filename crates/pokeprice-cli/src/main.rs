mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::{run_search, SourceArg};

#[derive(Debug, Parser)]
#[command(name = "pokeprice-cli")]
#[command(about = "Pokémon card price lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the catalogs for a card and print the result envelope as JSON
    Search {
        /// Card or Pokémon name to search for
        pokemon: String,

        /// Grade to echo in the envelope (e.g. PSA10); does not filter results
        #[arg(long)]
        grade: Option<String>,

        /// Which catalogs to consult
        #[arg(long, value_enum, default_value_t = SourceArg::Auto)]
        source: SourceArg,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = pokeprice_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            pokemon,
            grade,
            source,
            pretty,
        } => run_search(&config, &pokemon, grade.as_deref(), source, pretty).await?,
    }

    Ok(())
}
