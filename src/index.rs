use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CrrError, Result};
use crate::parser::listing::ListingEntry;
use crate::parser::value::Value;
use crate::parser::ParsedArticle;

/// One regulation article. Parse products stay `None` until first access and
/// are only ever filled together with `raw_html`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub number: String,
    pub title: String,
    pub source_url: String,
    pub raw_html: Option<String>,
    pub body_lines: Option<Vec<String>>,
    pub structure: Option<Value>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl ArticleRecord {
    pub fn from_listing(entry: ListingEntry) -> Self {
        Self {
            number: entry.number,
            title: entry.title,
            source_url: entry.url,
            raw_html: None,
            body_lines: None,
            structure: None,
            fetched_at: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.parsed().is_some()
    }

    /// Body lines and structure, once both are present.
    pub fn parsed(&self) -> Option<(&[String], &Value)> {
        Some((self.body_lines.as_deref()?, self.structure.as_ref()?))
    }

    /// Store a fetched page and its parse products in one step.
    pub fn fill(&mut self, raw_html: String, parsed: ParsedArticle) {
        self.raw_html = Some(raw_html);
        self.body_lines = Some(parsed.body_lines);
        self.structure = Some(parsed.structure);
        self.fetched_at = Some(Utc::now());
    }
}

/// Diagnostic view of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleSummary<'a> {
    pub number: &'a str,
    pub title: &'a str,
    pub loaded: bool,
}

/// All known articles in listing order, persisted as one JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleIndex {
    pub built_at: DateTime<Utc>,
    articles: Vec<ArticleRecord>,
}

impl ArticleIndex {
    /// Build from listing entries; a repeated number replaces the earlier record in place.
    pub fn from_listing(entries: impl IntoIterator<Item = ListingEntry>) -> Self {
        let mut index = Self {
            built_at: Utc::now(),
            articles: Vec::new(),
        };
        for entry in entries {
            let record = ArticleRecord::from_listing(entry);
            match index.position(&record.number) {
                Some(i) => index.articles[i] = record,
                None => index.articles.push(record),
            }
        }
        index
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&json).map_err(|source| CrrError::CacheCorrupt {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded {} articles from {}", index.len(), path.display());
        Ok(index)
    }

    /// Write the whole snapshot, replacing any previous one.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn position(&self, number: &str) -> Option<usize> {
        self.articles.iter().position(|a| a.number == number)
    }

    pub fn get(&self, number: &str) -> Option<&ArticleRecord> {
        self.articles.iter().find(|a| a.number == number)
    }

    pub fn get_mut(&mut self, number: &str) -> Option<&mut ArticleRecord> {
        self.articles.iter_mut().find(|a| a.number == number)
    }

    pub fn records(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.articles.iter()
    }

    /// Lazy `(number, title, loaded)` view; never fetches.
    pub fn summaries(&self) -> impl Iterator<Item = ArticleSummary<'_>> {
        self.articles.iter().map(|a| ArticleSummary {
            number: &a.number,
            title: &a.title,
            loaded: a.is_loaded(),
        })
    }
}
