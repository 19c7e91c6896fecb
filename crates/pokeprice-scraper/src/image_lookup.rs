//! Card-image lookup against a pokemontcg.io-style JSON API.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ScraperError;
use crate::record::UNKNOWN_NUMBER;

#[derive(Debug, Deserialize)]
struct CardsResponse {
    #[serde(default)]
    data: Vec<CardEntry>,
}

#[derive(Debug, Deserialize)]
struct CardEntry {
    #[serde(default)]
    images: Option<CardImages>,
}

#[derive(Debug, Deserialize)]
struct CardImages {
    large: Option<String>,
    small: Option<String>,
}

/// Finds an image for a card by name and number.
#[derive(Debug, Clone)]
pub struct ImageLookup {
    client: Client,
    base_url: String,
}

impl ImageLookup {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the best image URL for the card, or `None` on any failure.
    pub async fn find_image(&self, name: &str, number: &str) -> Option<String> {
        match self.try_find_image(name, number).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(name, number, error = %e, "image lookup failed");
                None
            }
        }
    }

    async fn try_find_image(
        &self,
        name: &str,
        number: &str,
    ) -> Result<Option<String>, ScraperError> {
        let url = self.cards_url(name, number)?;
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<CardsResponse>(&body).map_err(|e| {
            ScraperError::Deserialize {
                context: format!("image lookup for {name}"),
                source: e,
            }
        })?;

        Ok(parsed
            .data
            .into_iter()
            .next()
            .and_then(|card| card.images)
            .and_then(|images| images.large.or(images.small)))
    }

    fn cards_url(&self, name: &str, number: &str) -> Result<String, ScraperError> {
        let raw = format!("{}/cards", self.base_url);
        let mut url = reqwest::Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("q", &lookup_query(name, number))
            .append_pair("pageSize", "1");
        Ok(url.to_string())
    }
}

static TRAILING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\s+(?:#\s*\d+|no\.?\s*\d+|\d+\s*/\s*\d+))+\s*$")
        .expect("valid trailing number regex")
});

/// Drops trailing `#N`, `No. N` and `N/M` tokens from a scraped display
/// name; the number is queried separately.
fn bare_card_name(name: &str) -> &str {
    let stripped = match TRAILING_NUMBER_RE.find(name) {
        Some(m) => name[..m.start()].trim(),
        None => name.trim(),
    };
    if stripped.is_empty() {
        name.trim()
    } else {
        stripped
    }
}

/// `name:"<name>" number:<n>`, dropping the number clause when unknown.
pub(crate) fn lookup_query(name: &str, number: &str) -> String {
    let name = name.replace('"', "");
    let name = bare_card_name(&name);
    if number.is_empty() || number == UNKNOWN_NUMBER {
        format!("name:\"{name}\"")
    } else {
        format!("name:\"{name}\" number:{number}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_includes_known_number() {
        assert_eq!(lookup_query("Charizard", "4"), "name:\"Charizard\" number:4");
    }

    #[test]
    fn query_drops_unknown_number_and_quotes() {
        assert_eq!(lookup_query(" Mew \"ex\" ", "?"), "name:\"Mew ex\"");
    }

    #[test]
    fn query_strips_trailing_card_numbers() {
        assert_eq!(lookup_query("Charizard #4", "4"), "name:\"Charizard\" number:4");
        assert_eq!(lookup_query("Pikachu 58/102", "58"), "name:\"Pikachu\" number:58");
        assert_eq!(lookup_query("Mewtwo No. 10", "10"), "name:\"Mewtwo\" number:10");
        assert_eq!(lookup_query("Porygon2 #2", "?"), "name:\"Porygon2\"");
    }

    #[test]
    fn query_keeps_name_made_only_of_a_number() {
        assert_eq!(lookup_query("#4", "4"), "name:\"#4\" number:4");
    }

    #[test]
    fn cards_url_is_encoded() {
        let lookup = ImageLookup::new(Client::new(), "https://api.pokemontcg.io/v2/");
        let url = lookup.cards_url("Charizard", "4").unwrap();
        assert!(url.starts_with("https://api.pokemontcg.io/v2/cards?q=name%3A%22Charizard%22+number%3A4"));
        assert!(url.ends_with("&pageSize=1"));
    }

    #[test]
    fn response_prefers_large_image() {
        let parsed: CardsResponse = serde_json::from_str(
            r#"{"data":[{"images":{"small":"https://img/s.png","large":"https://img/l.png"}}]}"#,
        )
        .unwrap();
        let images = parsed.data.into_iter().next().and_then(|c| c.images).unwrap();
        assert_eq!(images.large.or(images.small).as_deref(), Some("https://img/l.png"));
    }
}
