//! The versioned list of static assets the worker pre-caches.

use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

const DEFAULT_ROOT: &str = "restaurant-reviews";
const DEFAULT_VERSION: &str = "v9";

const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/manifest.json",
    "restaurant.html",
    "dist/main.js",
    "dist/restaurant_info.js",
    "/sw.js",
    "css/styles.css",
    "css/styles-sm.css",
    "css/styles-xs.css",
    "https://cdnjs.cloudflare.com/ajax/libs/normalize/8.0.1/normalize.min.css",
    "https://unpkg.com/leaflet@1.3.1/dist/leaflet.css",
    "img/1.jpg",
    "img/2.jpg",
    "img/3.jpg",
    "img/4.jpg",
    "img/5.jpg",
    "img/6.jpg",
    "img/7.jpg",
    "img/8.jpg",
    "img/9.jpg",
    "img/10.jpg",
];

/// Static asset manifest.
///
/// Bumping `version` is the only way to invalidate cached assets: activation
/// deletes every bucket under `root` except `{root}-{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetManifest {
    pub root: String,
    pub version: String,
    pub assets: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|asset| (*asset).to_string()).collect(),
        }
    }
}

impl AssetManifest {
    /// Parse a manifest from `{"root": .., "version": .., "assets": [..]}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(raw)?;
        if manifest.root.trim().is_empty() || manifest.version.trim().is_empty() {
            return Err(Error::InvalidInput(
                "manifest root and version must not be empty".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Name of the bucket holding this generation
    pub fn bucket_name(&self) -> String {
        format!("{}-{}", self.root, self.version)
    }

    /// Whether `bucket` belongs to this app (any generation)
    pub fn owns_bucket(&self, bucket: &str) -> bool {
        bucket
            .strip_prefix(self.root.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// Absolute URLs for every entry, relative ones resolved against `origin`.
    pub fn resolve(&self, origin: &Url) -> Result<Vec<Url>> {
        self.assets
            .iter()
            .map(|asset| cache_key(origin, asset))
            .collect()
    }
}

/// Resolve `raw` against `origin` and drop the query string and fragment.
///
/// Both stored entries and incoming requests go through this, so lookups
/// ignore query-string variance.
pub fn cache_key(origin: &Url, raw: &str) -> Result<Url> {
    let mut url = origin
        .join(raw.trim())
        .map_err(|error| Error::InvalidInput(format!("invalid asset URL {raw:?}: {error}")))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
