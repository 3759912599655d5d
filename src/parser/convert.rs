//! Recursive classification of page markup into [`Value`]s.
//!
//! Every node is classified once against an ordered rule list (first match
//! wins), then the kind is matched exhaustively. The order matters: a
//! `<p class="container">` is also a paragraph, and a `<div class="list">`
//! may also have exactly two children.

use scraper::node::Node;
use scraper::ElementRef;
use tracing::debug;

use super::image::{self, MediaStore};
use super::table;
use super::value::Value;
use crate::error::{CrrError, Result};
use crate::text;

const PARAGRAPH_TAG: &str = "p";
const BLOCK_TAG: &str = "div";
const TABLE_TAG: &str = "table";
const IMAGE_TAG: &str = "img";

const CONTAINER_CLASS: &str = "container";
const INLINE_ELEMENT_CLASS: &str = "inline-element";
const LIST_CLASS: &str = "list";

/// A convertible child: an element or a non-blank text node.
#[derive(Debug, Clone, Copy)]
pub enum Child<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    ContainerParagraph,
    Paragraph,
    InlineElement,
    List,
    Table,
    LabeledBlock,
    Image,
    Unknown,
}

type Rule = (NodeKind, fn(ElementRef<'_>) -> bool);

/// Element rules in priority order. Text nodes are matched before these.
const RULES: &[Rule] = &[
    (NodeKind::ContainerParagraph, |el| {
        is_tag(el, PARAGRAPH_TAG) && has_class(el, CONTAINER_CLASS)
    }),
    (NodeKind::Paragraph, |el| is_tag(el, PARAGRAPH_TAG)),
    (NodeKind::InlineElement, |el| has_class(el, INLINE_ELEMENT_CLASS)),
    (NodeKind::List, |el| has_class(el, LIST_CLASS)),
    (NodeKind::Table, |el| is_tag(el, TABLE_TAG)),
    (NodeKind::LabeledBlock, |el| {
        is_tag(el, BLOCK_TAG) && element_children(el).count() == 2
    }),
    (NodeKind::Image, |el| is_tag(el, IMAGE_TAG)),
];

pub fn classify(el: ElementRef<'_>) -> NodeKind {
    RULES
        .iter()
        .find(|(_, matches)| matches(el))
        .map_or(NodeKind::Unknown, |(kind, _)| *kind)
}

/// Direct element children, in document order.
pub fn element_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Direct element children plus non-blank text nodes. Comments are dropped.
pub fn content_children(el: ElementRef<'_>) -> Vec<Child<'_>> {
    el.children()
        .filter_map(|node| match node.value() {
            Node::Text(t) if !t.trim().is_empty() => Some(Child::Text(t)),
            Node::Element(_) => ElementRef::wrap(node).map(Child::Element),
            _ => None,
        })
        .collect()
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn element_text(el: ElementRef<'_>) -> String {
    text::normalize_parts(el.text())
}

/// Converts markup into values, writing inline images to the media store.
pub struct Converter<'m> {
    media: &'m MediaStore,
}

impl<'m> Converter<'m> {
    pub fn new(media: &'m MediaStore) -> Self {
        Self { media }
    }

    pub fn convert(&self, child: Child<'_>) -> Result<Value> {
        match child {
            Child::Text(t) => Ok(Value::Scalar(text::normalize(t))),
            Child::Element(el) => self.convert_element(el),
        }
    }

    pub fn convert_element(&self, el: ElementRef<'_>) -> Result<Value> {
        let kind = classify(el);
        debug!("<{}> -> {:?}", el.value().name(), kind);

        match kind {
            NodeKind::ContainerParagraph | NodeKind::InlineElement | NodeKind::List => {
                self.convert_all(content_children(el))
            }
            NodeKind::Paragraph => Ok(Value::Scalar(element_text(el))),
            NodeKind::Table => table::convert_table(self, el),
            NodeKind::LabeledBlock => {
                let children: Vec<_> = element_children(el).collect();
                let [label, body] = children[..] else {
                    return Err(unknown(el));
                };
                let value = self.convert_all(content_children(body))?;
                Ok(Value::mapping(element_text(label), value))
            }
            NodeKind::Image => Ok(Value::Media(image::extract_image(el, self.media)?)),
            NodeKind::Unknown => Err(unknown(el)),
        }
    }

    /// Convert each child in order; a single result collapses to itself.
    pub fn convert_all(&self, children: Vec<Child<'_>>) -> Result<Value> {
        let items = children
            .into_iter()
            .map(|c| self.convert(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::sequence(items))
    }
}

fn unknown(el: ElementRef<'_>) -> CrrError {
    CrrError::UnknownElementKind {
        tag: el.value().name().to_string(),
    }
}
