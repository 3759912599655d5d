use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::convert::{element_children, element_text, is_tag};

static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());

const MAIN_CONTENT_MARKER: &str = "Main content:";
const FOOTNOTES_ID: &str = "footnotes";

fn is_marker(el: ElementRef<'_>) -> bool {
    is_tag(el, "div") && el.text().collect::<String>().trim_start().starts_with(MAIN_CONTENT_MARKER)
}

/// Top-level content nodes of an article page, in source order.
///
/// The page layout is: a `div` labeled "Main content:", whose parent's
/// second `div` child wraps the article; that wrapper's first element holds
/// one node per point (plus an optional `#footnotes` node).
pub fn content_nodes(doc: &Html, include_footnotes: bool) -> Option<Vec<ElementRef<'_>>> {
    let mut marker = doc.select(&DIV).find(|d| is_marker(*d))?;
    while let Some(inner) = element_children(marker).find(|c| is_marker(*c)) {
        marker = inner;
    }

    let parent = marker.parent().and_then(ElementRef::wrap)?;
    let article = element_children(parent).filter(|c| is_tag(*c, "div")).nth(1)?;
    let holder = element_children(article).next()?;

    Some(
        element_children(holder)
            .filter(|n| include_footnotes || !is_footnotes(*n))
            .collect(),
    )
}

pub fn is_footnotes(el: ElementRef<'_>) -> bool {
    el.value().id() == Some(FOOTNOTES_ID)
}

/// One normalized line per content node.
pub fn body_lines(nodes: &[ElementRef<'_>]) -> Vec<String> {
    nodes.iter().map(|n| element_text(*n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> Html {
        let html = std::fs::read_to_string(format!("tests/fixtures/{name}.html")).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn footnotes_excluded_by_default() {
        let doc = fixture("article_4");
        let lines = body_lines(&content_nodes(&doc, false).unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1."));
        assert!(lines[1].starts_with("2."));
        assert!(lines.iter().all(|l| !l.contains("OJ L 176")));
    }

    #[test]
    fn footnotes_on_request() {
        let doc = fixture("article_4");
        let lines = body_lines(&content_nodes(&doc, true).unwrap());
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("OJ L 176"));
    }

    #[test]
    fn missing_marker() {
        let doc = Html::parse_document("<html><body><div><p>nothing here</p></div></body></html>");
        assert!(content_nodes(&doc, false).is_none());
    }
}
