pub mod candidates;
pub mod catalog;
pub mod error;
pub mod fetch;
pub mod grade;
mod html;
pub mod image_lookup;
pub mod orchestrator;
pub mod pipeline;
pub mod price;
pub mod record;
pub mod sources;

pub use candidates::{find_candidates, BlockStrategy};
pub use error::ScraperError;
pub use fetch::{FetchHeaders, HtmlFetcher};
pub use grade::normalize_grade;
pub use image_lookup::ImageLookup;
pub use orchestrator::{Orchestrator, SourceSelection};
pub use pipeline::{Pipeline, PipelineOptions};
pub use price::{extract_from_price, extract_graded_prices, Currency};
pub use record::{build_record, BuiltRecord, RecordContext};
pub use sources::{CardMarket, CatalogSource, PriceCharting};
