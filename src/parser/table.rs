use scraper::ElementRef;

use super::convert::{element_children, is_tag, Converter};
use super::value::{TableRow, Value};
use crate::error::{CrrError, Result};

const ROW_GROUPS: &[&str] = &["thead", "tbody", "tfoot"];

/// Rebuild a `label-A | label-B | value` table into keyed rows.
///
/// Cells past the third are ignored.
pub fn convert_table(conv: &Converter<'_>, table: ElementRef<'_>) -> Result<Value> {
    let rows = table_rows(table)
        .enumerate()
        .map(|(i, tr)| convert_row(conv, i, tr))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::TableRows(rows))
}

/// Direct rows plus rows of direct row groups (the parser adds an implicit tbody).
fn table_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element_children(table).flat_map(|child| {
        let rows: Vec<_> = if ROW_GROUPS.iter().any(|g| is_tag(child, g)) {
            element_children(child).filter(|r| is_tag(*r, "tr")).collect()
        } else if is_tag(child, "tr") {
            vec![child]
        } else {
            Vec::new()
        };
        rows
    })
}

fn convert_row(conv: &Converter<'_>, index: usize, tr: ElementRef<'_>) -> Result<TableRow> {
    let cells = element_children(tr)
        .filter(|c| is_tag(*c, "td") || is_tag(*c, "th"))
        .map(|cell| cell_paragraphs(conv, cell))
        .collect::<Result<Vec<_>>>()?;

    let count = cells.len();
    let mut cells = cells.into_iter();
    let (Some(first), Some(second), Some(third)) = (cells.next(), cells.next(), cells.next())
    else {
        return Err(CrrError::MalformedTableRow {
            row: index,
            cells: count,
        });
    };

    let key = format!("{}{}", leading_text(&first), leading_text(&second));
    Ok(TableRow {
        key,
        value: Value::sequence(third),
    })
}

fn cell_paragraphs(conv: &Converter<'_>, cell: ElementRef<'_>) -> Result<Vec<Value>> {
    element_children(cell)
        .filter(|c| is_tag(*c, "p"))
        .map(|p| conv.convert_element(p))
        .collect()
}

/// Text of a cell's first converted paragraph, empty if it has none.
fn leading_text(paragraphs: &[Value]) -> String {
    paragraphs.first().map(Value::text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::image::MediaStore;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};

    fn convert(html: &str) -> Result<Value> {
        let tmp = tempfile::tempdir().unwrap();
        let media = MediaStore::new(tmp.path());
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().unwrap();
        Converter::new(&media).convert_element(table)
    }

    #[test]
    fn one_entry_per_row() {
        let html = r#"
            <table>
              <tr><td><p>(a)</p></td><td><p>Row one</p></td><td><p>20 %</p></td></tr>
              <tr><td><p>(b)</p></td><td><p>Row two</p></td><td><p>50 %</p><p>or less</p></td></tr>
            </table>"#;
        let v = convert(html).unwrap();
        assert_eq!(
            v,
            Value::TableRows(vec![
                TableRow {
                    key: "(a)Row one".into(),
                    value: Value::Scalar("20 %".into()),
                },
                TableRow {
                    key: "(b)Row two".into(),
                    value: Value::Sequence(vec![
                        Value::Scalar("50 %".into()),
                        Value::Scalar("or less".into()),
                    ]),
                },
            ])
        );
    }

    #[test]
    fn header_and_body_groups_are_walked() {
        let html = r#"
            <table>
              <thead><tr><th><p>1</p></th><th><p>Class</p></th><th><p>Weight</p></th></tr></thead>
              <tbody><tr><td><p>2</p></td><td><p>AAA</p></td><td><p>0 %</p></td></tr></tbody>
            </table>"#;
        match convert(html).unwrap() {
            Value::TableRows(rows) => {
                let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
                assert_eq!(keys, vec!["1Class", "2AAA"]);
            }
            other => panic!("expected table rows, got {other:?}"),
        }
    }

    #[test]
    fn short_row_is_rejected() {
        let html = r#"
            <table>
              <tr><td><p>a</p></td><td><p>b</p></td><td><p>c</p></td></tr>
              <tr><td><p>a</p></td><td><p>b</p></td></tr>
            </table>"#;
        let err = convert(html).unwrap_err();
        assert!(matches!(err, CrrError::MalformedTableRow { row: 1, cells: 2 }));
    }

    #[test]
    fn empty_label_cell_contributes_nothing() {
        let html = r#"<table><tr><td></td><td><p>Total</p></td><td><p>100</p></td></tr></table>"#;
        match convert(html).unwrap() {
            Value::TableRows(rows) => assert_eq!(rows[0].key, "Total"),
            other => panic!("expected table rows, got {other:?}"),
        }
    }
}
