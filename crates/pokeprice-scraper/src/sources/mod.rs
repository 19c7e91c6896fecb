//! Catalog sites the pipeline can scrape.

mod cardmarket;
mod pricecharting;

use pokeprice_core::{CardSource, PricePoint};

use crate::candidates::BlockStrategy;
use crate::error::ScraperError;
use crate::fetch::FetchHeaders;

pub use cardmarket::CardMarket;
pub use pricecharting::PriceCharting;

/// What the generic pipeline needs to know about one catalog site.
pub trait CatalogSource: Send + Sync {
    fn source(&self) -> CardSource;

    /// Base URL without a trailing slash.
    fn base_url(&self) -> &str;

    /// Builds the search-page URL for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if the query is blank or the base
    /// URL cannot be parsed.
    fn search_url(&self, query: &str) -> Result<String, ScraperError>;

    fn headers(&self) -> FetchHeaders;

    /// Candidate-block shapes in priority order.
    fn strategies(&self) -> &'static [BlockStrategy];

    /// Price points found in one fragment, at most one per grade, highest
    /// grade first.
    fn extract_prices(&self, fragment: &str) -> Vec<PricePoint>;

    /// Whether unpriced records should have their detail pages fetched.
    fn follows_detail_links(&self) -> bool {
        false
    }
}

/// Appends `path` to `base_url` and sets a single query parameter.
fn search_url_with(
    base_url: &str,
    path: &str,
    param: &str,
    value: &str,
) -> Result<String, ScraperError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ScraperError::InvalidUrl {
            url: base_url.to_owned(),
            reason: "search query is empty".to_owned(),
        });
    }

    let raw = format!("{}{path}", base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair(param, value);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_query() {
        let url = search_url_with("https://example.com/", "/search", "q", "mr mime").unwrap();
        assert_eq!(url, "https://example.com/search?q=mr+mime");
    }

    #[test]
    fn search_url_keeps_base_path_prefix() {
        let url = search_url_with("http://127.0.0.1:8080/mirror", "/search", "q", "eevee").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/mirror/search?q=eevee");
    }

    #[test]
    fn blank_query_is_rejected() {
        let err = search_url_with("https://example.com", "/search", "q", "  ").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidUrl { .. }));
    }

    #[test]
    fn unparseable_base_is_rejected() {
        let err = search_url_with("not a url", "/search", "q", "mew").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidUrl { .. }));
    }
}
