use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{CrrError, Result};
use crate::fetch::Fetcher;
use crate::index::{ArticleIndex, ArticleRecord, ArticleSummary};
use crate::parser::image::MediaStore;
use crate::parser::listing;
use crate::parser::parse_article;
use crate::parser::value::Value;

/// A CRR session: the article index plus everything needed to fill it lazily.
///
/// Not meant to be shared across tasks; all mutation goes through `&mut self`.
pub struct Crr<F> {
    index: ArticleIndex,
    fetcher: F,
    media: MediaStore,
    settings: Settings,
}

impl<F: Fetcher> Crr<F> {
    /// Load the cached snapshot when allowed, otherwise build from the homepage.
    /// A corrupt snapshot falls back to a fresh build. The index is saved once opened.
    pub async fn open(settings: Settings, fetcher: F) -> Result<Self> {
        let path = settings.index_path();
        let cached = if settings.load_cached && path.is_file() {
            match ArticleIndex::load(&path) {
                Ok(index) => Some(index),
                Err(e @ CrrError::CacheCorrupt { .. }) => {
                    warn!("{}; rebuilding", e);
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        let index = match cached {
            Some(index) => index,
            None => build(&fetcher, &settings).await?,
        };

        let crr = Self::with_index(index, settings, fetcher);
        crr.persist()?;
        Ok(crr)
    }

    pub fn with_index(index: ArticleIndex, settings: Settings, fetcher: F) -> Self {
        let media = MediaStore::new(settings.media_dir());
        debug!("Media store at {}", media.dir().display());
        Self {
            index,
            fetcher,
            media,
            settings,
        }
    }

    pub fn index(&self) -> &ArticleIndex {
        &self.index
    }

    /// Replace the index with a fresh build from the homepage.
    pub async fn rebuild(&mut self) -> Result<()> {
        self.index = build(&self.fetcher, &self.settings).await?;
        self.persist_if_eager()
    }

    /// Normalized body lines of an article, fetched and parsed on first access.
    pub async fn article_body(&mut self, number: &str) -> Result<&[String]> {
        let (lines, _) = self.ensure_loaded(number).await?;
        Ok(lines)
    }

    /// Converted point structure of an article, fetched and parsed on first access.
    pub async fn article_structure(&mut self, number: &str) -> Result<&Value> {
        let (_, structure) = self.ensure_loaded(number).await?;
        Ok(structure)
    }

    pub fn list_articles(&self) -> impl Iterator<Item = ArticleSummary<'_>> {
        self.index.summaries()
    }

    /// Load every article not yet parsed, at most `limit` of them.
    /// `on_done` is called after each article. Stops at the first failure.
    pub async fn load_unloaded(
        &mut self,
        limit: Option<usize>,
        mut on_done: impl FnMut(&str),
    ) -> Result<usize> {
        let pending: Vec<String> = self
            .index
            .records()
            .filter(|a| !a.is_loaded())
            .map(|a| a.number.clone())
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        for number in &pending {
            let loaded = self.ensure_loaded(number).await.map(|_| ());
            if let Err(e) = loaded {
                // Keep what this run already parsed, even when saving is deferred.
                self.persist()?;
                return Err(e);
            }
            on_done(number);
        }
        Ok(pending.len())
    }

    pub fn persist(&self) -> Result<()> {
        let path = self.settings.index_path();
        self.index.persist(&path)?;
        debug!("Saved index to {}", path.display());
        Ok(())
    }

    fn persist_if_eager(&self) -> Result<()> {
        if self.settings.always_save {
            self.persist()?;
        }
        Ok(())
    }

    async fn ensure_loaded(&mut self, number: &str) -> Result<(&[String], &Value)> {
        let record = self
            .index
            .get(number)
            .ok_or_else(|| CrrError::ArticleNotFound(number.to_string()))?;

        if record.is_loaded() {
            debug!("Article {} served from cache", number);
        } else {
            let (html, parsed) = match &record.raw_html {
                Some(html) => {
                    let parsed = self.parse(number, html)?;
                    (html.clone(), parsed)
                }
                None => {
                    info!("Getting Article {} online", number);
                    let html = self.fetcher.fetch(&record.source_url).await?;
                    let parsed = self.parse(number, &html)?;
                    (html, parsed)
                }
            };

            if let Some(record) = self.index.get_mut(number) {
                record.fill(html, parsed);
            }
            self.persist_if_eager()?;
        }

        match self.index.get(number).and_then(ArticleRecord::parsed) {
            Some(parsed) => Ok(parsed),
            None => Err(CrrError::NotLoaded(number.to_string())),
        }
    }

    fn parse(&self, number: &str, html: &str) -> Result<crate::parser::ParsedArticle> {
        parse_article(number, html, self.settings.include_footnotes, &self.media)
    }
}

/// Fetch the homepage listing and create one unloaded record per article link.
pub async fn build<F: Fetcher>(fetcher: &F, settings: &Settings) -> Result<ArticleIndex> {
    info!("Building article index from {}", settings.homepage_url);
    let html = fetcher
        .fetch(&settings.homepage_url)
        .await
        .map_err(|e| CrrError::IndexUnavailable(e.to_string()))?;

    let index = ArticleIndex::from_listing(listing::parse_listing(&html, &settings.base_url));
    if index.is_empty() {
        return Err(CrrError::IndexUnavailable(format!(
            "no article links found on {}",
            settings.homepage_url
        )));
    }
    info!("Indexed {} articles", index.len());
    Ok(index)
}
