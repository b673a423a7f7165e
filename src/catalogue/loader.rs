//! Flyer data loading
//!
//! Reads the flyer feed JSON and resolves relative image URLs.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::types::{CatalogueError, FlyerData, Result};

/// Maximum characters of an unparsable body echoed to the log
const MAX_LOGGED_BODY_CHARS: usize = 512;

/// Source of flyer data
pub trait CatalogueSource {
    /// Load products and the flyer page
    fn fetch_flyer_data(&self) -> Result<FlyerData>;
}

/// Resolve a possibly relative image URL against `base_url`.
///
/// `http://` and `https://` URLs are returned unchanged. Otherwise one
/// leading `./` or `/` is removed and the path is joined to the base.
pub fn prefix_image_url(url: &str, base_url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    let clean_path = url
        .strip_prefix("./")
        .or_else(|| url.strip_prefix('/'))
        .unwrap_or(url);

    format!("{}/{}", base_url.trim_end_matches('/'), clean_path)
}

impl FlyerData {
    /// Parse flyer data from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            let snippet: String = json.chars().take(MAX_LOGGED_BODY_CHARS).collect();
            error!(error = %e, body = %snippet, "failed to parse flyer data");
            CatalogueError::InvalidJson(e.to_string())
        })
    }

    /// Read and parse flyer data from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogueError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Prefix the page image URL and every product image URL with `base_url`
    pub fn prefix_image_urls(&mut self, base_url: &str) {
        self.flyer_page.image_url = prefix_image_url(&self.flyer_page.image_url, base_url);
        for product in self.products.values_mut() {
            product.image_url = prefix_image_url(&product.image_url, base_url);
        }
    }
}

/// Flyer data stored in a local JSON file
#[derive(Debug, Clone)]
pub struct FileCatalogue {
    pub path: PathBuf,
    /// Base URL applied to relative image URLs
    pub image_base_url: Option<String>,
}

impl FileCatalogue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            image_base_url: None,
        }
    }

    #[must_use]
    pub fn with_image_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.image_base_url = Some(base_url.into());
        self
    }
}

impl CatalogueSource for FileCatalogue {
    fn fetch_flyer_data(&self) -> Result<FlyerData> {
        let mut data = FlyerData::from_file(&self.path)?;
        if let Some(base) = &self.image_base_url {
            data.prefix_image_urls(base);
        }
        debug!(
            path = %self.path.display(),
            products = data.products.len(),
            hotspots = data.flyer_page.hotspots.len(),
            "loaded flyer data"
        );
        Ok(data)
    }
}
