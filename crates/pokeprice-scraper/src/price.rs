//! Price-window extraction: pairs grade labels with the nearest currency
//! amount and folds duplicates into one averaged point per grade.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use pokeprice_core::{CardSource, Grade, PricePoint, MAX_PRICE_UNITS};
use regex::Regex;

use crate::catalog::GRADE_LABEL_RE;
use crate::grade::normalize_grade;
use crate::html::window;

/// Bytes scanned before a label's start offset.
pub const WINDOW_BEFORE: usize = 150;
/// Bytes scanned after a label's start offset.
pub const WINDOW_AFTER: usize = 300;

/// Bytes after a "From" marker searched for its amount.
const FROM_WINDOW: usize = 40;

static USD_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?)").expect("valid USD regex")
});
static EUR_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:€|&euro;)\s*((?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d{1,2})?)|((?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d{1,2})?)\s*(?:€|&euro;)",
    )
    .expect("valid EUR regex")
});
static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").expect("valid from regex"));

/// Currency an upstream page quotes prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    /// `$1,234.56`
    Usd,
    /// `€1.234,56` or `1.234,56 €`
    Eur,
}

impl Currency {
    /// Fixed multiplier to USD, applied before rounding to cents.
    #[must_use]
    pub fn usd_factor(self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 1.1,
        }
    }

    fn amount_re(self) -> &'static Regex {
        match self {
            Currency::Usd => &*USD_AMOUNT_RE,
            Currency::Eur => &*EUR_AMOUNT_RE,
        }
    }

    /// Parses a matched number token, stripping thousands separators.
    fn parse_number(self, raw: &str) -> Option<f64> {
        let cleaned = match self {
            Currency::Usd => raw.replace(',', ""),
            Currency::Eur => raw.replace('.', "").replace(',', "."),
        };
        cleaned.parse::<f64>().ok()
    }

    /// All amount tokens in `text` as `(start, end, amount)`.
    fn amounts(self, text: &str) -> Vec<(usize, usize, f64)> {
        self.amount_re()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.get(1).or_else(|| caps.get(2))?;
                let amount = self.parse_number(number.as_str())?;
                Some((whole.start(), whole.end(), amount))
            })
            .collect()
    }

    /// Converts a major-unit amount to USD cents.
    ///
    /// Returns `None` unless the amount lies strictly inside
    /// `(0, MAX_PRICE_UNITS)` before conversion.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_usd_cents(self, amount: f64) -> Option<u32> {
        if !amount.is_finite() || amount <= 0.0 || amount >= MAX_PRICE_UNITS {
            return None;
        }
        let cents = (amount * self.usd_factor() * 100.0).round();
        if cents < 1.0 || cents > f64::from(u32::MAX) {
            return None;
        }
        Some(cents as u32)
    }
}

fn in_bounds(amount: f64) -> bool {
    amount > 0.0 && amount < MAX_PRICE_UNITS
}

/// Finds the amount belonging to a label at `offset` within `text`: the
/// first token after the label, else the closest token before it.
///
/// This is not "first amount anywhere in the window". In a row like
/// `Ungraded $412 PSA 10 $10,276` the window around `PSA 10` also covers
/// `$412`, which belongs to the previous label.
fn amount_near(text: &str, offset: usize, currency: Currency) -> Option<f64> {
    let amounts = currency.amounts(text);
    amounts
        .iter()
        .find(|(start, _, _)| *start >= offset)
        .or_else(|| amounts.iter().rev().find(|(_, end, _)| *end <= offset))
        .map(|(_, _, amount)| *amount)
}

/// Scans every grade label in `html`, pairs it with a nearby amount, and
/// returns one point per grade (duplicates averaged), highest grade first.
#[must_use]
pub fn extract_graded_prices(html: &str, currency: Currency, source: CardSource) -> Vec<PricePoint> {
    extract_graded_prices_with(html, currency, source, &GRADE_LABEL_RE)
}

/// Same as [`extract_graded_prices`] with a caller-supplied label pattern.
#[must_use]
pub fn extract_graded_prices_with(
    html: &str,
    currency: Currency,
    source: CardSource,
    labels: &Regex,
) -> Vec<PricePoint> {
    let mut observed: Vec<(Grade, f64)> = Vec::new();

    for label in labels.find_iter(html) {
        let Some(grade) = normalize_grade(label.as_str()) else {
            continue;
        };
        let (text, offset) = window(html, label.start(), WINDOW_BEFORE, WINDOW_AFTER);
        if let Some(amount) = amount_near(text, offset, currency).filter(|a| in_bounds(*a)) {
            observed.push((grade, amount));
        }
    }

    average_by_grade(observed, currency, source)
}

/// Folds `(grade, amount)` observations into one point per grade using the
/// arithmetic mean, sorted highest grade first.
#[must_use]
pub fn average_by_grade(
    observed: impl IntoIterator<Item = (Grade, f64)>,
    currency: Currency,
    source: CardSource,
) -> Vec<PricePoint> {
    let mut sums: BTreeMap<Grade, (f64, u32)> = BTreeMap::new();
    for (grade, amount) in observed {
        if !in_bounds(amount) {
            continue;
        }
        let entry = sums.entry(grade).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    sums.into_iter()
        .rev()
        .filter_map(|(grade, (sum, count))| {
            let mean = sum / f64::from(count);
            let cents = currency.to_usd_cents(mean)?;
            PricePoint::new(grade, cents, source)
        })
        .collect()
}

/// Extracts a listing's single "From" price as an ungraded point.
///
/// Prefers the amount right after a `From` marker and falls back to the
/// first amount anywhere in `html`.
#[must_use]
pub fn extract_from_price(html: &str, currency: Currency, source: CardSource) -> Option<PricePoint> {
    let after_marker = FROM_RE.find_iter(html).find_map(|m| {
        let (text, _) = window(html, m.end(), 0, FROM_WINDOW);
        currency
            .amounts(text)
            .first()
            .map(|(_, _, amount)| *amount)
    });
    let amount = after_marker.or_else(|| {
        currency
            .amounts(html)
            .first()
            .map(|(_, _, amount)| *amount)
    })?;

    let cents = currency.to_usd_cents(amount)?;
    PricePoint::new(Grade::UNGRADED, cents, source)
}
