mod app_config;
mod cards;
mod config;
mod error;

pub use app_config::{AppConfig, Environment};
pub use cards::{
    CardRecord, CardSource, Grade, PricePoint, ResponseSource, SearchResponse, MAX_PRICE_CENTS,
    MAX_PRICE_UNITS, UNGRADED_LABEL,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
