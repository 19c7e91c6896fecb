//! Per-candidate record building.
//!
//! Every field is read through an ordered list of [`FieldPattern`]s; the
//! first pattern that yields an acceptable value wins and a missing field
//! takes its sentinel. Building a record cannot fail.

use std::sync::LazyLock;

use pokeprice_core::{CardRecord, CardSource, PricePoint};
use regex::Regex;

use crate::catalog::SET_CATALOG;
use crate::html::{absolutize_url, capitalize, extract_attr, text_content, Attr};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 150;
const SET_MAX_CHARS: usize = 100;

/// Sentinel for a card number that could not be read.
pub const UNKNOWN_NUMBER: &str = "?";

/// Which view of a fragment a pattern runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Raw markup; the capture is reduced to visible text.
    Markup,
    /// Tag-stripped visible text.
    Text,
}

/// A named regex that reads one field value from capture group 1.
#[derive(Debug)]
pub struct FieldPattern {
    name: &'static str,
    re: Regex,
    scope: Scope,
}

impl FieldPattern {
    fn markup(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            re: Regex::new(pattern).expect("valid field pattern regex"),
            scope: Scope::Markup,
        }
    }

    fn text(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            re: Regex::new(pattern).expect("valid field pattern regex"),
            scope: Scope::Text,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the first capture that `accept` allows.
    ///
    /// `text` must be the visible text of `fragment`.
    pub fn try_extract(
        &self,
        fragment: &str,
        text: &str,
        accept: impl Fn(&str) -> bool,
    ) -> Option<String> {
        let haystack = match self.scope {
            Scope::Markup => fragment,
            Scope::Text => text,
        };
        self.re
            .captures_iter(haystack)
            .filter_map(|caps| caps.get(1))
            .map(|m| match self.scope {
                Scope::Markup => text_content(m.as_str()),
                Scope::Text => m.as_str().trim().to_string(),
            })
            .find(|value| accept(value))
    }
}

fn first_match(
    patterns: &[FieldPattern],
    fragment: &str,
    text: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        let value = pattern.try_extract(fragment, text, &accept)?;
        tracing::trace!(pattern = pattern.name(), value = %value, "field pattern matched");
        Some(value)
    })
}

static NAME_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        FieldPattern::markup("heading", r"(?is)<h[1-6]\b[^>]*>(.*?)</h[1-6]\s*>"),
        FieldPattern::markup(
            "title_class",
            r#"(?is)<(?:span|td)\b[^>]*\bclass\s*=\s*["'][^"']*(?:title|name)[^"']*["'][^>]*>(.*?)</(?:span|td)\s*>"#,
        ),
        FieldPattern::markup("anchor", r"(?is)<a\b[^>]*>(.*?)</a\s*>"),
    ]
});

static SET_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![FieldPattern::markup(
        "set_class",
        r#"(?is)<(?:td|span|div)\b[^>]*\bclass\s*=\s*["'][^"']*(?:set|series|expansion)[^"']*["'][^>]*>(.*?)</(?:td|span|div)\s*>"#,
    )]
});

static NUMBER_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        FieldPattern::text("slash", r"\b(\d{1,4})\s*/\s*\d{1,4}\b"),
        FieldPattern::text("hash", r"#\s*(\d{1,4})\b"),
        FieldPattern::text("no", r"(?i)\bno\.\s*(\d{1,4})\b"),
    ]
});

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));
static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex"));
static IMAGE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpe?g|png|webp)(?:\?[^\s]*)?$").expect("valid image extension regex")
});
static IMAGE_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)large|hires|high|1600").expect("valid regex"));

const IMAGE_ATTRS: [Attr; 3] = [Attr::Src, Attr::DataSrc, Attr::DataOriginal];

/// Where a record is being built from.
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    pub source: CardSource,
    /// Base URL of the source; relative links resolve against it.
    pub base_url: &'a str,
    pub query: &'a str,
}

/// A built record plus the link the pipeline may follow for more prices.
#[derive(Debug, Clone)]
pub struct BuiltRecord {
    pub record: CardRecord,
    pub detail_url: Option<String>,
}

/// Builds the `index`-th record of a response from one candidate fragment.
#[must_use]
pub fn build_record(
    fragment: &str,
    index: usize,
    ctx: RecordContext<'_>,
    prices: Vec<PricePoint>,
) -> BuiltRecord {
    let text = text_content(fragment);
    let query_lower = ctx.query.trim().to_lowercase();

    let record = CardRecord {
        id: record_id(ctx.source, ctx.query, index),
        name: extract_name(fragment, &text, &query_lower).unwrap_or_else(|| capitalize(ctx.query)),
        set_name: extract_set(fragment, &text)
            .unwrap_or_else(|| ctx.source.display_name().to_string()),
        number: extract_number(fragment, &text).unwrap_or_else(|| UNKNOWN_NUMBER.to_string()),
        image_url: extract_image(fragment, ctx.base_url),
        prices,
        source: ctx.source,
    };

    BuiltRecord {
        record,
        detail_url: extract_detail_link(fragment, ctx.base_url),
    }
}

/// `<prefix>_<query lowercased, whitespace runs as '-'>_<index>`.
#[must_use]
pub fn record_id(source: CardSource, query: &str, index: usize) -> String {
    let slug = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("{}_{slug}_{index}", source.id_prefix())
}

pub(crate) fn extract_name(fragment: &str, text: &str, query_lower: &str) -> Option<String> {
    first_match(&NAME_PATTERNS, fragment, text, |value| {
        let len = value.chars().count();
        (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len)
            && value.to_lowercase().contains(query_lower)
    })
}

pub(crate) fn extract_set(fragment: &str, text: &str) -> Option<String> {
    first_match(&SET_PATTERNS, fragment, text, |value| {
        !value.is_empty() && value.chars().count() <= SET_MAX_CHARS
    })
    .or_else(|| {
        let lower = text.to_lowercase();
        SET_CATALOG
            .iter()
            .find(|(needle, _)| contains_word(&lower, needle))
            .map(|(_, display)| (*display).to_string())
    })
}

pub(crate) fn extract_number(fragment: &str, text: &str) -> Option<String> {
    first_match(&NUMBER_PATTERNS, fragment, text, |value| {
        value.chars().any(|c| c.is_ascii_digit())
    })
    .map(|value| value.chars().filter(char::is_ascii_digit).collect())
}

/// First usable image URL, preferring ones that look high-resolution.
pub(crate) fn extract_image(fragment: &str, base_url: &str) -> Option<String> {
    let mut found: Vec<String> = Vec::new();
    for m in IMG_TAG_RE.find_iter(fragment) {
        let tag = m.as_str();
        for attr in IMAGE_ATTRS {
            let Some(raw) = extract_attr(tag, attr) else {
                continue;
            };
            if !IMAGE_EXT_RE.is_match(&raw) {
                continue;
            }
            if let Some(url) = absolutize_url(base_url, &raw) {
                if !found.contains(&url) {
                    found.push(url);
                }
            }
        }
    }

    let hinted = found.iter().position(|url| IMAGE_HINT_RE.is_match(url));
    match hinted {
        Some(idx) => Some(found.swap_remove(idx)),
        None => found.into_iter().next(),
    }
}

/// First anchor that resolves to a page on the source's own host.
pub(crate) fn extract_detail_link(fragment: &str, base_url: &str) -> Option<String> {
    let base_host = reqwest::Url::parse(base_url).ok()?.host_str()?.to_ascii_lowercase();
    ANCHOR_TAG_RE.find_iter(fragment).find_map(|m| {
        let href = extract_attr(m.as_str(), Attr::Href)?;
        let url = absolutize_url(base_url, &href)?;
        let parsed = reqwest::Url::parse(&url).ok()?;
        let same_host = parsed
            .host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(&base_host));
        (same_host && parsed.path().len() > 1).then_some(url)
    })
}

/// Substring match that refuses to split words on either side.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
