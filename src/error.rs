use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrrError>;

#[derive(Debug, Error)]
pub enum CrrError {
    /// Network or HTTP failure from the remote fetcher.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Listing page could not be fetched or yielded no article links.
    #[error("article index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("could not find article {0:?}; use `crr_parser list` for the full list of articles")]
    ArticleNotFound(String),

    /// Markup dialect drift: a node matched none of the known kinds.
    #[error("unknown element kind <{tag}>")]
    UnknownElementKind { tag: String },

    #[error("malformed table row {row}: expected at least 3 cells, found {cells}")]
    MalformedTableRow { row: usize, cells: usize },

    #[error("cannot segment article {number} at node {position}: {reason}")]
    UnsegmentableArticle {
        number: String,
        position: usize,
        reason: String,
    },

    /// A record that should have been filled still lacks body lines or structure.
    #[error("article {0} has no parsed body after loading")]
    NotLoaded(String),

    #[error("main content not found on page of article {0}")]
    ContentNotFound(String),

    #[error("invalid embedded image: {0}")]
    InvalidImage(String),

    /// Conversion failure inside a specific point of an article.
    #[error("article {number}, point {point}: {source}")]
    InArticle {
        number: String,
        point: usize,
        #[source]
        source: Box<CrrError>,
    },

    #[error("cached index at {} is corrupt: {source}", .path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CrrError {
    /// Strip `InArticle` context down to the underlying error.
    pub fn root(&self) -> &CrrError {
        match self {
            CrrError::InArticle { source, .. } => source.root(),
            other => other,
        }
    }
}
