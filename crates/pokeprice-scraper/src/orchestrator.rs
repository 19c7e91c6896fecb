//! Primary-then-secondary source fallback.

use futures::stream::{self, StreamExt};
use pokeprice_core::{AppConfig, CardRecord, CardSource, SearchResponse};

use crate::error::ScraperError;
use crate::fetch::HtmlFetcher;
use crate::image_lookup::ImageLookup;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::sources::{CardMarket, CatalogSource, PriceCharting};

const IMAGE_LOOKUP_CONCURRENCY: usize = 4;

/// Which sources a search may consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceSelection {
    /// Primary, falling back to secondary.
    #[default]
    Auto,
    PrimaryOnly,
    SecondaryOnly,
}

impl SourceSelection {
    fn uses_primary(self) -> bool {
        matches!(self, SourceSelection::Auto | SourceSelection::PrimaryOnly)
    }

    fn uses_secondary(self) -> bool {
        matches!(self, SourceSelection::Auto | SourceSelection::SecondaryOnly)
    }
}

/// Runs the catalog pipelines and always produces a response envelope.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    primary: Pipeline<PriceCharting>,
    secondary: Pipeline<CardMarket>,
    image_lookup: Option<ImageLookup>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        primary: Pipeline<PriceCharting>,
        secondary: Pipeline<CardMarket>,
        image_lookup: Option<ImageLookup>,
    ) -> Self {
        Self {
            primary,
            secondary,
            image_lookup,
        }
    }

    /// Wires both pipelines and the optional image lookup to one shared
    /// HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = HtmlFetcher::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.min_page_len,
        )?;
        let options = PipelineOptions::from_config(config);
        let image_lookup = config
            .image_lookup_url
            .as_deref()
            .map(|url| ImageLookup::new(fetcher.client().clone(), url));

        Ok(Self::new(
            Pipeline::new(
                PriceCharting::new(config.primary_base_url.as_str()),
                fetcher.clone(),
                options,
            ),
            Pipeline::new(
                CardMarket::new(config.secondary_base_url.as_str()),
                fetcher,
                options,
            ),
            image_lookup,
        ))
    }

    /// Searches primary, then secondary. Never fails: when neither source
    /// yields cards the envelope is empty with source `none`.
    ///
    /// `grade` is echoed back and does not filter the cards.
    pub async fn search(&self, query: &str, grade: Option<&str>) -> SearchResponse {
        self.search_with(query, grade, SourceSelection::Auto).await
    }

    /// Same as [`Orchestrator::search`], restricted to `selection`.
    pub async fn search_with(
        &self,
        query: &str,
        grade: Option<&str>,
        selection: SourceSelection,
    ) -> SearchResponse {
        let query = query.trim();
        let grade = grade
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_owned);

        let mut found = None;
        if selection.uses_primary() {
            found = attempt(&self.primary, query).await;
        }
        if found.is_none() && selection.uses_secondary() {
            found = attempt(&self.secondary, query).await;
        }

        match found {
            Some((source, mut cards)) => {
                self.fill_images(&mut cards).await;
                SearchResponse::found(query, grade, source, cards)
            }
            None => {
                tracing::info!(query, "no source produced cards");
                SearchResponse::empty(query, grade)
            }
        }
    }

    /// Looks up images for records that have none.
    async fn fill_images(&self, cards: &mut [CardRecord]) {
        let Some(lookup) = &self.image_lookup else {
            return;
        };
        let wanted: Vec<(usize, String, String)> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.image_url.is_none())
            .map(|(idx, card)| (idx, card.name.clone(), card.number.clone()))
            .collect();
        if wanted.is_empty() {
            return;
        }

        let results = stream::iter(wanted.into_iter().map(|(idx, name, number)| async move {
            (idx, lookup.find_image(&name, &number).await)
        }))
        .buffer_unordered(IMAGE_LOOKUP_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

        for (idx, url) in results {
            if let Some(url) = url {
                cards[idx].image_url = Some(url);
            }
        }
    }
}

/// Runs one pipeline; an error or an empty result both count as "nothing".
async fn attempt<S: CatalogSource>(
    pipeline: &Pipeline<S>,
    query: &str,
) -> Option<(CardSource, Vec<CardRecord>)> {
    let source = pipeline.source().source();
    match pipeline.run(query).await {
        Ok(cards) if !cards.is_empty() => Some((source, cards)),
        Ok(_) => {
            tracing::info!(%source, query, "source returned no cards");
            None
        }
        Err(e) => {
            tracing::warn!(%source, query, error = %e, "source failed");
            None
        }
    }
}
