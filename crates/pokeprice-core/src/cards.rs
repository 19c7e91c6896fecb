use std::fmt;

use serde::{Deserialize, Serialize};

/// Exclusive upper bound for a price in major currency units.
pub const MAX_PRICE_UNITS: f64 = 100_000.0;

/// Exclusive upper bound for [`PricePoint::price`], in cents.
pub const MAX_PRICE_CENTS: u32 = 100_000 * 100;

/// Label used for ungraded price points.
pub const UNGRADED_LABEL: &str = "Neohodnoceno";

/// Catalog site a record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSource {
    /// The price-aggregator site, consulted first.
    PriceCharting,
    /// The marketplace site, consulted when the aggregator has nothing.
    CardMarket,
}

impl CardSource {
    /// Display name, also used as the set-name sentinel.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            CardSource::PriceCharting => "PriceCharting",
            CardSource::CardMarket => "CardMarket",
        }
    }

    /// Short prefix used when building record ids.
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            CardSource::PriceCharting => "pc",
            CardSource::CardMarket => "cm",
        }
    }
}

impl fmt::Display for CardSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Canonical grade on the PSA scale. `PSA0` stands for ungraded/raw.
///
/// Serialized as its tag, e.g. `"PSA10"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Grade(u8);

impl Grade {
    pub const UNGRADED: Grade = Grade(0);
    pub const GEM_MINT: Grade = Grade(10);

    /// Returns `None` for values above 10.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value <= 10).then_some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_ungraded(self) -> bool {
        self.0 == 0
    }

    /// Canonical tag such as `"PSA9"`.
    #[must_use]
    pub fn tag(self) -> String {
        format!("PSA{}", self.0)
    }

    /// Human-readable label: `"Neohodnoceno"` for ungraded, else `"PSA {n}"`.
    #[must_use]
    pub fn label(self) -> String {
        if self.is_ungraded() {
            UNGRADED_LABEL.to_string()
        } else {
            format!("PSA {}", self.0)
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PSA{}", self.0)
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.tag()
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("PSA")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Grade::new)
            .ok_or_else(|| format!("invalid grade tag: {value}"))
    }
}

/// One grade's observed price for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub grade: Grade,
    /// USD cents.
    pub price: u32,
    pub source: CardSource,
    #[serde(rename = "type")]
    pub label: String,
}

impl PricePoint {
    /// Builds a point, rejecting prices outside `(0, MAX_PRICE_CENTS)`.
    #[must_use]
    pub fn new(grade: Grade, price: u32, source: CardSource) -> Option<Self> {
        if price == 0 || price >= MAX_PRICE_CENTS {
            return None;
        }
        Some(Self {
            grade,
            price,
            source,
            label: grade.label(),
        })
    }
}

/// One catalog entry for a physical card printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Unique within a single response only.
    pub id: String,
    pub name: String,
    pub set_name: String,
    /// Card number within its set, or `"?"` when unknown.
    pub number: String,
    pub image_url: Option<String>,
    /// At most one point per grade, highest grade first.
    pub prices: Vec<PricePoint>,
    pub source: CardSource,
}

impl CardRecord {
    #[must_use]
    pub fn has_prices(&self) -> bool {
        !self.prices.is_empty()
    }

    #[must_use]
    pub fn price_for(&self, grade: Grade) -> Option<&PricePoint> {
        self.prices.iter().find(|p| p.grade == grade)
    }
}

/// Which source produced a [`SearchResponse`], or `none` when both failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseSource {
    PriceCharting,
    CardMarket,
    #[serde(rename = "none")]
    None,
}

impl From<CardSource> for ResponseSource {
    fn from(source: CardSource) -> Self {
        match source {
            CardSource::PriceCharting => ResponseSource::PriceCharting,
            CardSource::CardMarket => ResponseSource::CardMarket,
        }
    }
}

/// JSON envelope returned to API consumers.
///
/// `success` is always `true`: callers detect total failure through
/// `count == 0` and `source == "none"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub pokemon: String,
    /// Echo of the requested grade filter. Not applied to `cards`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub cards: Vec<CardRecord>,
    pub count: usize,
    pub source: ResponseSource,
}

impl SearchResponse {
    #[must_use]
    pub fn found(
        pokemon: &str,
        grade: Option<String>,
        source: CardSource,
        cards: Vec<CardRecord>,
    ) -> Self {
        Self {
            success: true,
            pokemon: pokemon.to_string(),
            grade,
            count: cards.len(),
            cards,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn empty(pokemon: &str, grade: Option<String>) -> Self {
        Self {
            success: true,
            pokemon: pokemon.to_string(),
            grade,
            cards: Vec::new(),
            count: 0,
            source: ResponseSource::None,
        }
    }
}
