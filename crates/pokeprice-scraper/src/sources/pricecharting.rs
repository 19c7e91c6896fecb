use pokeprice_core::{CardSource, PricePoint};

use super::{search_url_with, CatalogSource};
use crate::candidates::{BlockStrategy, PRIMARY_STRATEGIES};
use crate::error::ScraperError;
use crate::fetch::FetchHeaders;
use crate::price::{extract_graded_prices, Currency};

const SEARCH_PATH: &str = "/search-products";
const QUERY_SUFFIX: &str = "pokemon card";

/// Price aggregator quoting graded prices in USD.
#[derive(Debug, Clone)]
pub struct PriceCharting {
    base_url: String,
}

impl PriceCharting {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl CatalogSource for PriceCharting {
    fn source(&self) -> CardSource {
        CardSource::PriceCharting
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, query: &str) -> Result<String, ScraperError> {
        let query = query.trim();
        if query.is_empty() {
            return search_url_with(&self.base_url, SEARCH_PATH, "q", query);
        }
        search_url_with(
            &self.base_url,
            SEARCH_PATH,
            "q",
            &format!("{query} {QUERY_SUFFIX}"),
        )
    }

    fn headers(&self) -> FetchHeaders {
        FetchHeaders::default()
    }

    fn strategies(&self) -> &'static [BlockStrategy] {
        PRIMARY_STRATEGIES
    }

    fn extract_prices(&self, fragment: &str) -> Vec<PricePoint> {
        extract_graded_prices(fragment, Currency::Usd, CardSource::PriceCharting)
    }

    fn follows_detail_links(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeprice_core::Grade;

    #[test]
    fn search_url_appends_card_suffix() {
        let source = PriceCharting::new("https://www.pricecharting.com/");
        assert_eq!(
            source.search_url(" charizard ").unwrap(),
            "https://www.pricecharting.com/search-products?q=charizard+pokemon+card"
        );
    }

    #[test]
    fn blank_query_has_no_url() {
        let source = PriceCharting::new("https://www.pricecharting.com");
        assert!(source.search_url("").is_err());
    }

    #[test]
    fn prices_are_graded_usd() {
        let source = PriceCharting::new("https://www.pricecharting.com");
        let prices =
            source.extract_prices("<td>Ungraded</td><td>$12.00</td><td>PSA 10</td><td>$250.00</td>");
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].grade, Grade::GEM_MINT);
        assert_eq!(prices[0].price, 25_000);
        assert_eq!(prices[1].grade, Grade::UNGRADED);
        assert!(prices.iter().all(|p| p.source == CardSource::PriceCharting));
    }
}
