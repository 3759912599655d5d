use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use scraper::ElementRef;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::value::MediaRef;
use crate::error::{CrrError, Result};

/// Flat directory of decoded images keyed by content hash.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under `name`. Same name always means same bytes, so
    /// overwriting an existing file is harmless.
    pub fn store(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Filename for an encoded payload: hex sha256 plus `.jpg`.
pub fn media_name(encoded: &str) -> String {
    let digest = Sha256::digest(encoded.as_bytes());
    format!("{}.jpg", hex::encode(digest))
}

/// Decode an inline `data:` image and write it to the media store.
///
/// The `.jpg` extension is asserted, not verified: payloads are never
/// sniffed or validated as JPEG.
pub fn extract_image(el: ElementRef<'_>, media: &MediaStore) -> Result<MediaRef> {
    let src = el
        .value()
        .attr("src")
        .ok_or_else(|| CrrError::InvalidImage("missing src attribute".into()))?;
    let (_, encoded) = src
        .split_once(',')
        .ok_or_else(|| CrrError::InvalidImage("src is not a metadata,data pair".into()))?;
    let encoded = encoded.trim();

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| CrrError::InvalidImage(e.to_string()))?;

    let name = media_name(encoded);
    media.store(&name, &bytes)?;
    debug!("Stored image {} ({} bytes)", name, bytes.len());

    Ok(MediaRef {
        name,
        width: el.value().attr("width").map(str::to_string),
        height: el.value().attr("height").map(str::to_string),
    })
}
