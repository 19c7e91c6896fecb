//! Candidate-block discovery.
//!
//! Search pages from both catalogs are loosely structured, so several block
//! shapes are tried in priority order and the first shape that yields a
//! block mentioning the query wins for that page.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::text_contains;

/// One structural pattern that may delimit a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStrategy {
    /// `<tr>` search-result rows.
    TableRow,
    /// `<div>` whose class mentions product, result, item, or card.
    ResultDiv,
    /// `<div>` whose class mentions product, article, row, or card.
    ProductDiv,
    /// `<a href>` elements.
    Anchor,
    /// `<li>` elements.
    ListItem,
}

struct BlockShape {
    open: Regex,
    tokens: Regex,
    /// `<tr>` and `<li>` may omit their end tags.
    implicit_close: bool,
}

fn shape(open: &str, tag: &str, implicit_close: bool) -> BlockShape {
    BlockShape {
        open: Regex::new(open).expect("valid block open regex"),
        tokens: Regex::new(&format!(r"(?i)<(/?){tag}\b[^>]*>")).expect("valid block token regex"),
        implicit_close,
    }
}

static TABLE_ROW: LazyLock<BlockShape> = LazyLock::new(|| shape(r"(?i)<tr\b[^>]*>", "tr", true));
static RESULT_DIV: LazyLock<BlockShape> = LazyLock::new(|| {
    shape(
        r#"(?i)<div\b[^>]*\bclass\s*=\s*["'][^"']*(?:product|result|item|card)[^"']*["'][^>]*>"#,
        "div",
        false,
    )
});
static PRODUCT_DIV: LazyLock<BlockShape> = LazyLock::new(|| {
    shape(
        r#"(?i)<div\b[^>]*\bclass\s*=\s*["'][^"']*(?:product|article|row|card)[^"']*["'][^>]*>"#,
        "div",
        false,
    )
});
static ANCHOR: LazyLock<BlockShape> =
    LazyLock::new(|| shape(r"(?i)<a\b[^>]*\bhref\s*=[^>]*>", "a", false));
static LIST_ITEM: LazyLock<BlockShape> = LazyLock::new(|| shape(r"(?i)<li\b[^>]*>", "li", true));

impl BlockStrategy {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BlockStrategy::TableRow => "table_row",
            BlockStrategy::ResultDiv => "result_div",
            BlockStrategy::ProductDiv => "product_div",
            BlockStrategy::Anchor => "anchor",
            BlockStrategy::ListItem => "list_item",
        }
    }

    fn shape(self) -> &'static BlockShape {
        match self {
            BlockStrategy::TableRow => &TABLE_ROW,
            BlockStrategy::ResultDiv => &RESULT_DIV,
            BlockStrategy::ProductDiv => &PRODUCT_DIV,
            BlockStrategy::Anchor => &ANCHOR,
            BlockStrategy::ListItem => &LIST_ITEM,
        }
    }

    /// Lazily yields blocks of this shape whose visible text contains
    /// `query` (case-insensitive).
    ///
    /// A matching block that wraps two or more matching blocks of the same
    /// shape is a container; its children are yielded instead.
    #[must_use]
    pub fn blocks<'a>(self, html: &'a str, query: &str) -> Blocks<'a> {
        Blocks {
            html,
            shape: self.shape(),
            needle: query.trim().to_lowercase(),
            pos: 0,
        }
    }
}

impl BlockShape {
    /// Byte offset just past the block opened by the tag ending at `open_end`.
    fn block_end(&self, html: &str, open_end: usize) -> usize {
        let rest = &html[open_end..];
        let mut depth = 1usize;
        for caps in self.tokens.captures_iter(rest) {
            let Some(tag) = caps.get(0) else {
                continue;
            };
            let closing = caps.get(1).is_some_and(|g| !g.as_str().is_empty());
            if closing {
                depth -= 1;
                if depth == 0 {
                    return open_end + tag.end();
                }
            } else if self.implicit_close && depth == 1 {
                return open_end + tag.start();
            } else {
                depth += 1;
            }
        }
        html.len()
    }

    /// Counts matching blocks nested in `html[from..to]`, stopping at `limit`.
    fn matching_children(&self, html: &str, from: usize, to: usize, needle: &str, limit: usize) -> usize {
        let mut count = 0;
        let mut pos = from;
        while count < limit {
            let Some(open) = self.open.find_at(html, pos) else {
                break;
            };
            if open.start() >= to {
                break;
            }
            let end = self.block_end(html, open.end()).min(to);
            if text_contains(&html[open.start()..end], needle) {
                count += 1;
            }
            pos = end.max(open.end());
        }
        count
    }
}

/// Iterator returned by [`BlockStrategy::blocks`].
pub struct Blocks<'a> {
    html: &'a str,
    shape: &'static BlockShape,
    needle: String,
    pos: usize,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if self.pos >= self.html.len() {
                return None;
            }
            let open = self.shape.open.find_at(self.html, self.pos)?;
            let end = self.shape.block_end(self.html, open.end());
            let block = &self.html[open.start()..end];

            if !text_contains(block, &self.needle) {
                self.pos = end.max(open.end());
                continue;
            }
            if self
                .shape
                .matching_children(self.html, open.end(), end, &self.needle, 2)
                >= 2
            {
                self.pos = open.end();
                continue;
            }

            self.pos = end.max(open.end());
            return Some(block);
        }
    }
}

/// Block shapes tried for the aggregator's search page.
pub const PRIMARY_STRATEGIES: &[BlockStrategy] = &[
    BlockStrategy::TableRow,
    BlockStrategy::ResultDiv,
    BlockStrategy::Anchor,
    BlockStrategy::ListItem,
];

/// Block shapes tried for the marketplace's search page.
pub const SECONDARY_STRATEGIES: &[BlockStrategy] = &[
    BlockStrategy::ProductDiv,
    BlockStrategy::TableRow,
    BlockStrategy::ListItem,
    BlockStrategy::Anchor,
];

/// Returns up to `cap` candidate fragments from the first strategy that
/// yields any. An empty result means no strategy matched.
#[must_use]
pub fn find_candidates<'a>(
    html: &'a str,
    query: &str,
    strategies: &[BlockStrategy],
    cap: usize,
) -> Vec<&'a str> {
    for strategy in strategies {
        let found: Vec<&str> = strategy.blocks(html, query).take(cap).collect();
        if !found.is_empty() {
            tracing::debug!(
                strategy = strategy.name(),
                count = found.len(),
                "candidate blocks found"
            );
            return found;
        }
    }
    Vec::new()
}
