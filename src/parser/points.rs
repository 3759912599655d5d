use scraper::ElementRef;

use super::convert::{content_children, element_children, element_text, is_tag, Child};
use crate::error::{CrrError, Result};

/// One numbered or lettered point of an article.
#[derive(Debug, Clone)]
pub struct Point<'a> {
    pub label: String,
    /// Index of the content node that opened this point.
    pub position: usize,
    pub body: Vec<Child<'a>>,
}

/// Split an article's top-level content nodes into labeled points.
///
/// A node is either `label + body wrapper`, or a bare `<p>` that continues
/// the previous point (the source sometimes orphans trailing paragraphs).
pub fn segment<'a>(number: &str, nodes: &[ElementRef<'a>]) -> Result<Vec<Point<'a>>> {
    let mut points: Vec<Point<'a>> = Vec::new();

    for (position, &node) in nodes.iter().enumerate() {
        let unsegmentable = |reason: String| CrrError::UnsegmentableArticle {
            number: number.to_string(),
            position,
            reason,
        };

        if is_tag(node, "p") {
            let Some(prev) = points.last_mut() else {
                return Err(unsegmentable(
                    "continuation paragraph before any labeled point".into(),
                ));
            };
            prev.body.push(Child::Element(node));
            continue;
        }

        let children: Vec<_> = element_children(node).collect();
        let [label, wrapper] = children[..] else {
            return Err(unsegmentable(format!(
                "<{}> has {} element children, expected label and body",
                node.value().name(),
                children.len()
            )));
        };

        let body = if element_children(wrapper).next().is_none() {
            vec![Child::Element(wrapper)]
        } else {
            content_children(wrapper)
        };

        points.push(Point {
            label: element_text(label),
            position,
            body,
        });
    }

    Ok(points)
}
