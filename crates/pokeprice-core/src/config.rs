use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = parse_usize(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_url = |var: &str, raw: String| -> Result<String, ConfigError> {
        let url = reqwest::Url::parse(&raw).map_err(|e| invalid(var, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(var, format!("unsupported scheme \"{}\"", url.scheme())));
        }
        Ok(raw.trim_end_matches('/').to_string())
    };

    let env = parse_environment(&or_default("POKEPRICE_ENV", "development"))?;
    let bind_addr = parse_addr("POKEPRICE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("POKEPRICE_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("POKEPRICE_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "POKEPRICE_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("POKEPRICE_USER_AGENT", DEFAULT_USER_AGENT);
    let min_page_len = parse_positive("POKEPRICE_MIN_PAGE_LEN", "800")?;

    let primary_base_url = parse_url(
        "POKEPRICE_PRIMARY_BASE_URL",
        or_default("POKEPRICE_PRIMARY_BASE_URL", "https://www.pricecharting.com"),
    )?;
    let secondary_base_url = parse_url(
        "POKEPRICE_SECONDARY_BASE_URL",
        or_default("POKEPRICE_SECONDARY_BASE_URL", "https://www.cardmarket.com"),
    )?;
    let image_lookup_url = match lookup("POKEPRICE_IMAGE_LOOKUP_URL") {
        Ok(raw) if !raw.trim().is_empty() => {
            Some(parse_url("POKEPRICE_IMAGE_LOOKUP_URL", raw.trim().to_string())?)
        }
        _ => None,
    };

    let max_candidates = parse_positive("POKEPRICE_MAX_CANDIDATES", "60")?;
    let detail_concurrency = parse_positive("POKEPRICE_DETAIL_CONCURRENCY", "4")?;
    let max_detail_pages = parse_usize("POKEPRICE_MAX_DETAIL_PAGES", "12")?;
    let detail_enough_priced = parse_positive("POKEPRICE_DETAIL_ENOUGH_PRICED", "8")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        min_page_len,
        primary_base_url,
        secondary_base_url,
        image_lookup_url,
        max_candidates,
        detail_concurrency,
        max_detail_pages,
        detail_enough_priced,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "POKEPRICE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
