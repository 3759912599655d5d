use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use crate::text;

static ARTICLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[text-type="Article"]"#).unwrap());
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Article\s+(\S+?)\s*:\s*(.*)$").unwrap());

/// One article link from the homepage listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub number: String,
    pub title: String,
    pub url: String,
}

/// Collect every `<a text-type="Article">` on the listing page.
/// Anchors whose text is not `Article <num>: <title>` are skipped.
pub fn parse_listing(html: &str, base_url: &str) -> Vec<ListingEntry> {
    let doc = Html::parse_document(html);

    doc.select(&ARTICLE_LINK)
        .filter_map(|a| {
            let label = text::normalize_parts(a.text());
            let Some(caps) = ARTICLE_RE.captures(&label) else {
                warn!("Skipping article link with unexpected text: {:?}", label);
                return None;
            };
            let Some(href) = a.value().attr("href") else {
                warn!("Skipping article link without href: {:?}", label);
                return None;
            };
            Some(ListingEntry {
                number: caps[1].to_string(),
                title: caps[2].trim().to_string(),
                url: join_url(base_url, href),
            })
        })
        .collect()
}

fn join_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href)
    }
}
