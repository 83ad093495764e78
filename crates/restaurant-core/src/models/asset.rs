//! Cached static asset model

/// A static asset response held in an asset cache bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    /// Absolute request URL without query string or fragment
    pub url: String,
    /// HTTP status code of the cached response
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// When the entry was written (Unix ms)
    pub cached_at: i64,
}

impl CachedAsset {
    pub fn new(
        url: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            content_type,
            body,
            cached_at: crate::util::unix_millis_now(),
        }
    }

    /// Body size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.body.len()
    }
}
