//! Fetch, find candidates, build records, enrich from detail pages.

use futures::future::join_all;
use pokeprice_core::{AppConfig, CardRecord};

use crate::candidates::find_candidates;
use crate::error::ScraperError;
use crate::fetch::HtmlFetcher;
use crate::html::text_contains;
use crate::record::{build_record, BuiltRecord, RecordContext};
use crate::sources::CatalogSource;

/// Limits applied by one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Upper bound on candidate blocks turned into records.
    pub max_candidates: usize,
    /// Detail pages fetched at once.
    pub detail_concurrency: usize,
    /// Total detail pages fetched per run.
    pub max_detail_pages: usize,
    /// Enrichment stops once this many records carry prices.
    pub detail_enough_priced: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_candidates: 60,
            detail_concurrency: 4,
            max_detail_pages: 12,
            detail_enough_priced: 8,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_candidates: config.max_candidates,
            detail_concurrency: config.detail_concurrency,
            max_detail_pages: config.max_detail_pages,
            detail_enough_priced: config.detail_enough_priced,
        }
    }
}

/// Scrapes one catalog source.
#[derive(Debug, Clone)]
pub struct Pipeline<S> {
    source: S,
    fetcher: HtmlFetcher,
    options: PipelineOptions,
}

impl<S: CatalogSource> Pipeline<S> {
    #[must_use]
    pub fn new(source: S, fetcher: HtmlFetcher, options: PipelineOptions) -> Self {
        Self {
            source,
            fetcher,
            options,
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs a search for `query` and returns the records found.
    ///
    /// An unreachable or implausible search page yields `Ok(vec![])`. When no
    /// candidate block matches, the whole page is read as one record, but only
    /// if its text mentions the query and it carries prices.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the search URL cannot be built.
    pub async fn run(&self, query: &str) -> Result<Vec<CardRecord>, ScraperError> {
        let source = self.source.source();
        let search_url = self.source.search_url(query)?;

        let Some(html) = self
            .fetcher
            .fetch_page(&search_url, &self.source.headers())
            .await
        else {
            tracing::info!(%source, query, "search page unavailable");
            return Ok(Vec::new());
        };

        let ctx = RecordContext {
            source,
            base_url: self.source.base_url(),
            query,
        };
        let candidates = find_candidates(
            &html,
            query,
            self.source.strategies(),
            self.options.max_candidates,
        );

        let mut built: Vec<BuiltRecord> = if candidates.is_empty() {
            if !text_contains(&html, &query.trim().to_lowercase()) {
                tracing::info!(%source, query, "query not found on page");
                return Ok(Vec::new());
            }
            let prices = self.source.extract_prices(&html);
            if prices.is_empty() {
                tracing::info!(%source, query, "no candidates and no prices on page");
                return Ok(Vec::new());
            }
            tracing::debug!(%source, query, "using whole page as general candidate");
            let mut general = build_record(&html, 0, ctx, prices);
            general.detail_url = None;
            vec![general]
        } else {
            candidates
                .iter()
                .enumerate()
                .map(|(idx, fragment)| {
                    build_record(fragment, idx, ctx, self.source.extract_prices(fragment))
                })
                .collect()
        };

        if self.source.follows_detail_links() {
            self.enrich_details(&mut built, &search_url).await;
        }

        let records: Vec<CardRecord> = built.into_iter().map(|b| b.record).collect();
        tracing::info!(
            %source,
            query,
            count = records.len(),
            priced = records.iter().filter(|r| r.has_prices()).count(),
            "pipeline finished"
        );
        Ok(records)
    }

    /// Fills prices for unpriced records from their detail pages, a chunk
    /// at a time.
    async fn enrich_details(&self, built: &mut [BuiltRecord], search_url: &str) {
        let targets: Vec<(usize, String)> = built
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.record.has_prices())
            .filter_map(|(idx, b)| b.detail_url.clone().map(|url| (idx, url)))
            .take(self.options.max_detail_pages)
            .collect();
        if targets.is_empty() {
            return;
        }

        let mut headers = self.source.headers();
        headers.referer = Some(search_url.to_owned());

        for chunk in targets.chunks(self.options.detail_concurrency.max(1)) {
            let priced = built.iter().filter(|b| b.record.has_prices()).count();
            if priced >= self.options.detail_enough_priced {
                tracing::debug!(priced, "enough priced records, skipping remaining detail pages");
                break;
            }

            let pages = join_all(
                chunk
                    .iter()
                    .map(|(_, url)| self.fetcher.fetch_page(url, &headers)),
            )
            .await;

            for ((idx, url), page) in chunk.iter().zip(pages) {
                let Some(page) = page else {
                    continue;
                };
                let prices = self.source.extract_prices(&page);
                if prices.is_empty() {
                    tracing::debug!(url = %url, "detail page carried no prices");
                    continue;
                }
                built[*idx].record.prices = prices;
            }
        }
    }
}
