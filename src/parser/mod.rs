pub mod content;
pub mod convert;
pub mod image;
pub mod listing;
pub mod points;
pub mod table;
pub mod value;

use scraper::Html;

use crate::error::{CrrError, Result};
use convert::{content_children, Converter};
use image::MediaStore;
use value::Value;

const FOOTNOTES_LABEL: &str = "footnotes";

/// Parse products of one article page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    pub body_lines: Vec<String>,
    pub structure: Value,
}

/// Article page → content nodes → points → converted values.
///
/// All-or-nothing: any conversion failure fails the whole article.
pub fn parse_article(
    number: &str,
    html: &str,
    include_footnotes: bool,
    media: &MediaStore,
) -> Result<ParsedArticle> {
    let doc = Html::parse_document(html);
    let nodes = content::content_nodes(&doc, include_footnotes)
        .ok_or_else(|| CrrError::ContentNotFound(number.to_string()))?;

    let body_lines = content::body_lines(&nodes);
    let conv = Converter::new(media);

    let (footnotes, point_nodes): (Vec<_>, Vec<_>) =
        nodes.into_iter().partition(|n| content::is_footnotes(*n));

    let mut points = points::segment(number, &point_nodes)?
        .into_iter()
        .map(|p| {
            conv.convert_all(p.body)
                .map(|body| Value::mapping(p.label, body))
                .map_err(|e| CrrError::InArticle {
                    number: number.to_string(),
                    point: p.position,
                    source: Box::new(e),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    // Footnotes have no label/body shape; they are kept as one labeled block.
    for note in footnotes {
        let value = conv.convert_all(content_children(note))?;
        points.push(Value::mapping(FOOTNOTES_LABEL, value));
    }

    Ok(ParsedArticle {
        body_lines,
        structure: Value::sequence(points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use value::TableRow;

    fn scalar(s: &str) -> Value {
        Value::Scalar(s.to_string())
    }

    #[test]
    fn article_4_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/article_4.html").unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let media = MediaStore::new(tmp.path());

        let parsed = parse_article("4", &html, false, &media).unwrap();
        assert_eq!(parsed.body_lines.len(), 2);

        let Value::Sequence(points) = &parsed.structure else {
            panic!("expected two points, got {:?}", parsed.structure);
        };
        assert_eq!(points.len(), 2);

        let Value::Mapping { label, value } = &points[0] else {
            panic!("point 1 is not a mapping");
        };
        assert_eq!(label, "1.");
        let Value::Sequence(body) = value.as_ref() else {
            panic!("point 1 body is not a sequence");
        };
        assert_eq!(
            body[0],
            scalar("For the purposes of this Regulation, the following definitions shall apply:")
        );
        let Value::Sequence(defs) = &body[1] else {
            panic!("definitions list is not a sequence");
        };
        assert!(matches!(&defs[0], Value::Mapping { label, .. } if label == "(1)"));
        assert!(defs[1].text().ends_with("Directive 2014/65/EU(1);"));

        let Value::Mapping { label, value } = &points[1] else {
            panic!("point 2 is not a mapping");
        };
        assert_eq!(label, "2.");
        let Value::Sequence(body) = value.as_ref() else {
            panic!("point 2 body is not a sequence");
        };
        assert_eq!(
            body[1],
            Value::TableRows(vec![
                TableRow {
                    key: "Credit qualitystep 1".into(),
                    value: scalar("20 %"),
                },
                TableRow {
                    key: "Credit qualitystep 2".into(),
                    value: scalar("50 %"),
                },
            ])
        );
        match &body[2] {
            Value::Media(m) => {
                assert_eq!(m.name, image::media_name("/9j/4AAQSkZJRgABAQ=="));
                assert!(tmp.path().join(&m.name).exists());
            }
            other => panic!("expected media, got {other:?}"),
        }
    }

    #[test]
    fn footnotes_on_request_are_kept() {
        let html = std::fs::read_to_string("tests/fixtures/article_4.html").unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let media = MediaStore::new(tmp.path());

        let parsed = parse_article("4", &html, true, &media).unwrap();
        assert_eq!(parsed.body_lines.len(), 3);
        assert!(parsed.body_lines[2].contains("OJ L 176"));

        let Value::Sequence(points) = &parsed.structure else {
            panic!("expected a sequence, got {:?}", parsed.structure);
        };
        assert_eq!(points.len(), 3);
        let Value::Mapping { label, value } = &points[2] else {
            panic!("footnotes are not a mapping");
        };
        assert_eq!(label, "footnotes");
        assert!(value.text().starts_with("(1) Directive 2014/65/EU"));

        let without = parse_article("4", &html, false, &media).unwrap();
        assert_eq!(without.structure, Value::Sequence(points[..2].to_vec()));
    }

    #[test]
    fn conversion_errors_carry_article_context() {
        let html = r#"<html><body><section>
            <div>Main content:</div>
            <div><div>
              <div><span>1.</span><p>ok</p></div>
              <div><span>2.</span><div><p>a</p><section>drift</section></div></div>
            </div></div>
        </section></body></html>"#;
        let tmp = tempfile::tempdir().unwrap();
        let err = parse_article("12", html, false, &MediaStore::new(tmp.path())).unwrap_err();

        match &err {
            CrrError::InArticle { number, point, .. } => {
                assert_eq!(number, "12");
                assert_eq!(*point, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root(), CrrError::UnknownElementKind { tag } if tag == "section"));
    }

    #[test]
    fn page_without_content_region() {
        let tmp = tempfile::tempdir().unwrap();
        let err = parse_article("1", "<p>maintenance</p>", false, &MediaStore::new(tmp.path()))
            .unwrap_err();
        assert!(matches!(err, CrrError::ContentNotFound(ref n) if n == "1"));
    }
}
