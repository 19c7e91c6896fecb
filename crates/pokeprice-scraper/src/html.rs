//! Markup helpers shared by the extraction stages.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(?:script|style)>").expect("valid script regex")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Removes tags (and script/style bodies), decodes common entities, and
/// collapses whitespace.
pub(crate) fn text_content(fragment: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(fragment, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Decodes the handful of entities catalog sites put in card names.
pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&eacute;", "é")
        .replace("&#233;", "é")
        .replace("&euro;", "€")
        .replace("&amp;", "&")
}

/// Case-insensitive substring test against a fragment's visible text.
pub(crate) fn text_contains(fragment: &str, needle_lower: &str) -> bool {
    text_content(fragment)
        .to_lowercase()
        .contains(needle_lower)
}

// The leading `\s` keeps `src` from matching inside `data-src`.
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid src regex")
});
static DATA_SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\sdata-src\s*=\s*["']([^"']+)["']"#).expect("valid data-src regex")
});
static DATA_ORIGINAL_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\sdata-original\s*=\s*["']([^"']+)["']"#)
        .expect("valid data-original regex")
});
static HREF_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\shref\s*=\s*["']([^"']+)["']"#).expect("valid href regex")
});

/// Tag attributes the extractors read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attr {
    Src,
    DataSrc,
    DataOriginal,
    Href,
}

impl Attr {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Src => LazyLock::force(&SRC_ATTR_RE),
            Self::DataSrc => LazyLock::force(&DATA_SRC_ATTR_RE),
            Self::DataOriginal => LazyLock::force(&DATA_ORIGINAL_ATTR_RE),
            Self::Href => LazyLock::force(&HREF_ATTR_RE),
        }
    }
}

/// Reads an attribute value from a single tag.
pub(crate) fn extract_attr(tag: &str, attr: Attr) -> Option<String> {
    attr.pattern()
        .captures(tag)
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
}

/// Resolves `candidate` against `base_url`. Handles absolute,
/// protocol-relative, root-relative, and path-relative references.
pub(crate) fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.replace("&amp;", "&");
    let base = reqwest::Url::parse(base_url).ok()?;
    let joined = base.join(candidate.trim()).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// Returns the slice `[start - before, start + after)` of `html` with both
/// ends moved inward to char boundaries, plus `start`'s offset in the slice.
pub(crate) fn window(html: &str, start: usize, before: usize, after: usize) -> (&str, usize) {
    let mut lo = start.saturating_sub(before);
    while lo < start && !html.is_char_boundary(lo) {
        lo += 1;
    }
    let mut hi = start.saturating_add(after).min(html.len());
    while hi > start && !html.is_char_boundary(hi) {
        hi -= 1;
    }
    (&html[lo..hi], start - lo)
}

/// Uppercases the first character.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_strips_tags_and_entities() {
        let got = text_content("<td><a href=\"/x\">Charizard &amp; Friends</a>\n  <span>#4</span></td>");
        assert_eq!(got, "Charizard & Friends #4");
    }

    #[test]
    fn text_content_drops_script_bodies() {
        let got = text_content("<div>Pikachu<script>var charizard = 1;</script></div>");
        assert_eq!(got, "Pikachu");
    }

    #[test]
    fn absolutize_handles_relative_forms() {
        let base = "https://www.pricecharting.com";
        assert_eq!(
            absolutize_url(base, "/images/a.jpg").as_deref(),
            Some("https://www.pricecharting.com/images/a.jpg")
        );
        assert_eq!(
            absolutize_url(base, "//cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(
            absolutize_url(base, "https://img.example.com/a.png").as_deref(),
            Some("https://img.example.com/a.png")
        );
        assert!(absolutize_url(base, "javascript:void(0)").is_none());
    }

    #[test]
    fn window_snaps_to_char_boundaries() {
        let html = "€€€ PSA 10 €€€";
        let start = html.find("PSA").unwrap();
        let (slice, offset) = window(html, start, 2, 8);
        assert!(slice.starts_with(' ') || slice.starts_with("PSA"));
        assert_eq!(&slice[offset..offset + 3], "PSA");
    }

    #[test]
    fn src_does_not_match_inside_data_src() {
        let tag = r#"<img data-src="/lazy/pikachu.jpg" alt="Pikachu">"#;
        assert_eq!(extract_attr(tag, Attr::Src), None);
        assert_eq!(
            extract_attr(tag, Attr::DataSrc).as_deref(),
            Some("/lazy/pikachu.jpg")
        );
    }

    #[test]
    fn extract_attr_reads_each_attribute() {
        let tag = "<img\n  src='/a.png' data-original=\"/b.png\">";
        assert_eq!(extract_attr(tag, Attr::Src).as_deref(), Some("/a.png"));
        assert_eq!(extract_attr(tag, Attr::DataOriginal).as_deref(), Some("/b.png"));
        assert_eq!(
            extract_attr(r#"<a class="x" HREF="/game/mew-8">"#, Attr::Href).as_deref(),
            Some("/game/mew-8")
        );
        assert_eq!(extract_attr("<a class=\"x\">", Attr::Href), None);
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("charizard"), "Charizard");
        assert_eq!(capitalize(""), "");
    }
}
