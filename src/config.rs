use std::path::PathBuf;

pub const EBA_WEBSITE: &str = "https://www.eba.europa.eu";
pub const CRR_HOMEPAGE: &str = "https://www.eba.europa.eu/regulation-and-policy/single-rulebook/interactive-single-rulebook/108255";

const INDEX_FILE: &str = "crr_index.json";
const MEDIA_DIR: &str = "media";

/// Runtime settings for a CRR session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub homepage_url: String,
    /// Prefix for relative article hrefs found on the listing page.
    pub base_url: String,
    /// Reuse an existing snapshot instead of rebuilding from the homepage.
    pub load_cached: bool,
    /// Persist after every mutation; otherwise only on explicit `persist`.
    pub always_save: bool,
    pub include_footnotes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            homepage_url: CRR_HOMEPAGE.to_string(),
            base_url: EBA_WEBSITE.to_string(),
            load_cached: true,
            always_save: true,
            include_footnotes: false,
        }
    }
}

impl Settings {
    pub fn index_path(&self) -> PathBuf {
        self.cache_dir.join(INDEX_FILE)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.cache_dir.join(MEDIA_DIR)
    }
}

pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("crr_parser")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_cache_dir() {
        let settings = Settings {
            cache_dir: PathBuf::from("/var/cache/crr"),
            ..Default::default()
        };
        assert_eq!(settings.index_path(), PathBuf::from("/var/cache/crr/crr_index.json"));
        assert_eq!(settings.media_dir(), PathBuf::from("/var/cache/crr/media"));
        assert!(settings.always_save);
        assert!(!settings.include_footnotes);
    }
}
