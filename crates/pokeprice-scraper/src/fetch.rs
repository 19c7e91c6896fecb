//! Bounded-time HTML fetching for the catalog pipelines.
//!
//! Every failure mode (transport error, timeout, non-2xx status, suspiciously
//! short body) collapses to `None` at this boundary. Callers treat a missing
//! page as "no results", never as an error.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER};
use reqwest::Client;

use crate::error::ScraperError;

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Per-source request headers layered on top of the client's user agent.
#[derive(Debug, Clone)]
pub struct FetchHeaders {
    pub accept: &'static str,
    pub accept_language: &'static str,
    pub referer: Option<String>,
}

impl Default for FetchHeaders {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT,
            accept_language: DEFAULT_ACCEPT_LANGUAGE,
            referer: None,
        }
    }
}

impl FetchHeaders {
    #[must_use]
    pub fn with_referer(referer: impl Into<String>) -> Self {
        Self {
            referer: Some(referer.into()),
            ..Self::default()
        }
    }

    fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(ACCEPT, HeaderValue::from_static(self.accept));
        map.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(self.accept_language));
        map.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Some(value) = self
            .referer
            .as_deref()
            .and_then(|r| HeaderValue::from_str(r).ok())
        {
            map.insert(REFERER, value);
        }
        map
    }
}

/// Thin wrapper around `reqwest::Client` with a fixed timeout and a
/// minimum plausible page length.
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
    min_page_len: usize,
}

impl HtmlFetcher {
    /// Creates a fetcher whose requests (body included) are cancelled after
    /// `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        min_page_len: usize,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            min_page_len,
        })
    }

    /// Shared client, for collaborators that speak JSON rather than HTML.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches `url` and returns its body, or `None` on any failure.
    pub async fn fetch_page(&self, url: &str, headers: &FetchHeaders) -> Option<String> {
        match self.try_fetch(url, headers).await {
            Ok(body) => Some(body),
            Err(ScraperError::PageTooShort { len, .. }) => {
                tracing::debug!(url, len, "discarding near-empty page");
                None
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "page fetch failed");
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str, headers: &FetchHeaders) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .headers(headers.to_header_map())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        let len = body.chars().count();
        if len < self.min_page_len {
            return Err(ScraperError::PageTooShort {
                url: url.to_owned(),
                len,
                min: self.min_page_len,
            });
        }

        Ok(body)
    }
}
