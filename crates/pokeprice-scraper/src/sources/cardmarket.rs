use pokeprice_core::{CardSource, PricePoint};

use super::{search_url_with, CatalogSource};
use crate::candidates::{BlockStrategy, SECONDARY_STRATEGIES};
use crate::error::ScraperError;
use crate::fetch::FetchHeaders;
use crate::price::{extract_from_price, Currency};

const SEARCH_PATH: &str = "/en/Pokemon/Products/Search";
const REFERER_PATH: &str = "/en/Pokemon";

/// Marketplace listing a single "From" price in EUR per product.
#[derive(Debug, Clone)]
pub struct CardMarket {
    base_url: String,
}

impl CardMarket {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl CatalogSource for CardMarket {
    fn source(&self) -> CardSource {
        CardSource::CardMarket
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, query: &str) -> Result<String, ScraperError> {
        search_url_with(&self.base_url, SEARCH_PATH, "searchString", query)
    }

    fn headers(&self) -> FetchHeaders {
        FetchHeaders::with_referer(format!("{}{REFERER_PATH}", self.base_url))
    }

    fn strategies(&self) -> &'static [BlockStrategy] {
        SECONDARY_STRATEGIES
    }

    fn extract_prices(&self, fragment: &str) -> Vec<PricePoint> {
        extract_from_price(fragment, Currency::Eur, CardSource::CardMarket)
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeprice_core::Grade;

    #[test]
    fn search_url_uses_search_string_param() {
        let source = CardMarket::new("https://www.cardmarket.com");
        assert_eq!(
            source.search_url("Pikachu V").unwrap(),
            "https://www.cardmarket.com/en/Pokemon/Products/Search?searchString=Pikachu+V"
        );
    }

    #[test]
    fn headers_carry_catalog_referer() {
        let source = CardMarket::new("https://www.cardmarket.com/");
        assert_eq!(
            source.headers().referer.as_deref(),
            Some("https://www.cardmarket.com/en/Pokemon")
        );
    }

    #[test]
    fn from_price_becomes_single_ungraded_point() {
        let source = CardMarket::new("https://www.cardmarket.com");
        let prices = source.extract_prices("<div>Pikachu</div><div>From €50,00</div>");
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].grade, Grade::UNGRADED);
        assert_eq!(prices[0].price, 5_500);
        assert_eq!(prices[0].label, "Neohodnoceno");
    }

    #[test]
    fn never_follows_detail_links() {
        assert!(!CardMarket::new("https://www.cardmarket.com").follows_detail_links());
    }
}
