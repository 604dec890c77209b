//! Extraction of a page's title, meta description and links.

use regex::Regex;
use std::sync::LazyLock;

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 150;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["'][^>]*>"#)
        .expect("valid description regex")
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a[^>]*href=["'][^"']*["'][^>]*>"#).expect("valid link regex")
});

/// What the scraper reports about a page.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) link_count: usize,
    pub(crate) size: usize,
}

pub(crate) fn summarize(html: &str) -> Summary {
    let title = TITLE
        .captures(html)
        .map(|c| truncate(decode_entities(c[1].trim()).trim(), TITLE_MAX))
        .unwrap_or_else(|| "No title found".to_string());

    let description = DESCRIPTION
        .captures(html)
        .map(|c| truncate(decode_entities(c[1].trim()).trim(), DESCRIPTION_MAX))
        .unwrap_or_default();

    Summary {
        title,
        description,
        link_count: LINK.find_iter(html).count(),
        size: html.len(),
    }
}

/// Shortens `text` to at most `max` characters, ending with `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Decodes the handful of entities common in titles and descriptions.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = rest.find(';').filter(|&semi| semi <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
