//! Normalized media item descriptors.

/// Extension used when the platform reports none for a media file.
pub const DEFAULT_MEDIA_EXTENSION: &str = "mp4";

/// One remote media resource and the creator who posted it.
///
/// Produced by the gateway and consumed exactly once by the batch downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescriptor {
    media_url: String,
    media_extension: Option<String>,
    creator_username: String,
}

impl ItemDescriptor {
    /// Creates a descriptor, returning `None` when the media URL is empty.
    ///
    /// Extensions are stored without leading dots; an empty extension is
    /// treated as absent.
    #[must_use]
    pub fn new(
        media_url: impl Into<String>,
        media_extension: Option<&str>,
        creator_username: impl Into<String>,
    ) -> Option<Self> {
        let media_url = media_url.into().trim().to_string();
        if media_url.is_empty() {
            return None;
        }
        let media_extension = media_extension
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty());

        Some(Self {
            media_url,
            media_extension,
            creator_username: creator_username.into(),
        })
    }

    /// URL of the media file.
    #[must_use]
    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Extension reported by the platform, if any.
    #[must_use]
    pub fn media_extension(&self) -> Option<&str> {
        self.media_extension.as_deref()
    }

    /// Extension to name the local file with, falling back to [`DEFAULT_MEDIA_EXTENSION`].
    #[must_use]
    pub fn extension_or_default(&self) -> &str {
        self.media_extension().unwrap_or(DEFAULT_MEDIA_EXTENSION)
    }

    /// Username of the post's creator, used as the local base name.
    #[must_use]
    pub fn creator_username(&self) -> &str {
        &self.creator_username
    }
}
