//! Plain-text extraction from fetched file bodies

use regex::Regex;
use scraper::{Html, Selector};
use spchat_core::{Error, Result};
use std::sync::OnceLock;

const TEXT_SELECTORS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "td", "th", "blockquote",
];

/// Share of control characters in the sampled prefix above which a body
/// is treated as binary
const BINARY_CONTROL_RATIO: f64 = 0.05;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn looks_like_html(raw: &str) -> bool {
    let head = raw.trim_start().get(..256).unwrap_or(raw.trim_start());
    let lower = head.to_lowercase();
    lower.starts_with("<!doctype html") || lower.starts_with("<html") || lower.contains("<body")
}

/// Binary payloads (.docx, .pdf, .xlsx, ...) arrive here lossily decoded:
/// replacement characters where the bytes were not UTF-8, raw control
/// characters where they happened to be. Either signature marks the body
/// as not indexable.
fn looks_like_binary(raw: &str) -> bool {
    let mut control = 0usize;
    let mut total = 0usize;

    for c in raw.chars().take(2048) {
        if c == '\u{0}' || c == '\u{fffd}' {
            return true;
        }
        total += 1;
        if c.is_control() && c != '\n' && c != '\r' && c != '\t' {
            control += 1;
        }
    }

    total > 0 && (control as f64) / (total as f64) > BINARY_CONTROL_RATIO
}

/// Reduce a fetched file body to indexable plain text
///
/// HTML/ASPX pages are stripped down to their textual elements; other text
/// passes through with runs of whitespace collapsed. Bodies that look like
/// binary office formats are rejected rather than indexed as garbage.
pub fn extract_text(raw: &str) -> Result<String> {
    if looks_like_binary(raw) {
        return Err(Error::Indexing(
            "Binary or unsupported file format".to_string(),
        ));
    }

    if looks_like_html(raw) {
        Ok(extract_html_text(raw))
    } else {
        Ok(whitespace_re().replace_all(raw.trim(), " ").to_string())
    }
}

fn extract_html_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut parts: Vec<String> = Vec::new();

    for selector_str in TEXT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                let text = element.text().collect::<Vec<_>>().join(" ");
                let text = whitespace_re().replace_all(text.trim(), " ").to_string();
                if !text.is_empty() && !parts.contains(&text) {
                    parts.push(text);
                }
            }
        }
    }

    parts.join("\n")
}
