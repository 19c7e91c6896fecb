//! `search` command handler.

use clap::ValueEnum;
use pokeprice_core::{AppConfig, SearchResponse};
use pokeprice_scraper::{Orchestrator, SourceSelection};

/// Catalog selection accepted by `--source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Primary, falling back to secondary
    Auto,
    /// Primary catalog only
    Primary,
    /// Secondary catalog only
    Secondary,
}

impl From<SourceArg> for SourceSelection {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Auto => SourceSelection::Auto,
            SourceArg::Primary => SourceSelection::PrimaryOnly,
            SourceArg::Secondary => SourceSelection::SecondaryOnly,
        }
    }
}

/// Runs one search and prints the envelope to stdout.
///
/// # Errors
///
/// Returns an error if the query is blank, the HTTP client cannot be built,
/// or the envelope cannot be serialized.
pub(crate) async fn run_search(
    config: &AppConfig,
    pokemon: &str,
    grade: Option<&str>,
    source: SourceArg,
    pretty: bool,
) -> anyhow::Result<()> {
    let pokemon = pokemon.trim();
    if pokemon.is_empty() {
        anyhow::bail!("pokemon is required");
    }

    let orchestrator = Orchestrator::from_config(config)?;
    let response = orchestrator
        .search_with(pokemon, grade, source.into())
        .await;
    tracing::debug!(count = response.count, source = ?response.source, "search finished");

    println!("{}", render(&response, pretty)?);
    Ok(())
}

pub(crate) fn render(response: &SearchResponse, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    }
}
