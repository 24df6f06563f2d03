//! Scoped working directory for one export run.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::archive::ARCHIVE_FILE_NAME;

/// Subdirectory holding the downloaded media.
const MEDIA_DIR_NAME: &str = "media";

/// Transient storage owned by exactly one export run.
///
/// Downloads land in `<root>/media/`, the archive at
/// `<root>/downloaded_media.zip`, so no media file can collide with the
/// archive name. Everything is removed when the value is dropped.
#[derive(Debug)]
pub struct WorkingDirectory {
    root: TempDir,
    media_dir: PathBuf,
}

impl WorkingDirectory {
    /// Creates a fresh working directory under the system temp location.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory cannot be created.
    pub fn create() -> std::io::Result<Self> {
        let root = tempfile::Builder::new().prefix("media-export-").tempdir()?;
        Self::with_root(root)
    }

    /// Creates a working directory inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory cannot be created.
    pub fn create_in(parent: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("media-export-")
            .tempdir_in(parent)?;
        Self::with_root(root)
    }

    fn with_root(root: TempDir) -> std::io::Result<Self> {
        let media_dir = root.path().join(MEDIA_DIR_NAME);
        std::fs::create_dir(&media_dir)?;
        debug!(path = %root.path().display(), "created working directory");
        Ok(Self { root, media_dir })
    }

    /// Root of the working directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Directory downloads are written to.
    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Where the run's archive is built.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.path().join(ARCHIVE_FILE_NAME)
    }
}
