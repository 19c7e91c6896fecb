use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Upper bound for a single upstream fetch, body included.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Bodies shorter than this are treated as interstitial or error pages.
    pub min_page_len: usize,
    pub primary_base_url: String,
    pub secondary_base_url: String,
    /// Card-image lookup API base. `None` disables the lookup.
    pub image_lookup_url: Option<String>,
    pub max_candidates: usize,
    pub detail_concurrency: usize,
    pub max_detail_pages: usize,
    /// Detail enrichment stops once this many records carry prices.
    pub detail_enough_priced: usize,
}
