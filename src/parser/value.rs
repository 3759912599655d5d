use serde::{Deserialize, Serialize};

/// Output of the element converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Scalar(String),
    Sequence(Vec<Value>),
    /// Labeled sub-section: one label, one nested value.
    Mapping { label: String, value: Box<Value> },
    TableRows(Vec<TableRow>),
    Media(MediaRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub name: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl Value {
    /// Build a sequence, collapsing a single item to the item itself.
    pub fn sequence(mut items: Vec<Value>) -> Value {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Value::Sequence(items)
        }
    }

    pub fn mapping(label: impl Into<String>, value: Value) -> Value {
        Value::Mapping {
            label: label.into(),
            value: Box::new(value),
        }
    }

    /// Flattened text of every scalar and label, space separated.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Scalar(s) => {
                if !s.is_empty() {
                    out.push(s);
                }
            }
            Value::Sequence(items) => items.iter().for_each(|v| v.collect_text(out)),
            Value::Mapping { label, value } => {
                out.push(label);
                value.collect_text(out);
            }
            Value::TableRows(rows) => {
                for row in rows {
                    out.push(&row.key);
                    row.value.collect_text(out);
                }
            }
            Value::Media(_) => {}
        }
    }
}
