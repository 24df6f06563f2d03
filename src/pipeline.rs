//! End-to-end export run: fetch posts, download media, package, offer.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use media_export::{
//!     BatchDownloader, ExportEventSink, ExportOutcome, ExportPipeline, GraphqlGateway,
//!     MediaFetcher, NoopSink, DEFAULT_ENDPOINT,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(GraphqlGateway::new(DEFAULT_ENDPOINT)?);
//! let downloader = BatchDownloader::new(10, MediaFetcher::new()?)?;
//! let pipeline = ExportPipeline::new(gateway, downloader);
//! let sink: Arc<dyn ExportEventSink> = Arc::new(NoopSink);
//!
//! match pipeline.run(25, &sink).await? {
//!     ExportOutcome::NoItems => println!("No posts found."),
//!     ExportOutcome::Ready(artifact) => {
//!         let path = artifact.deliver_to(Path::new(".")).await?;
//!         println!("Saved {}", path.display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::archive::{
    ARCHIVE_MIME_TYPE, ArchiveError, ArchiveSummary, OFFERED_FILE_NAME, build_archive,
};
use crate::download::{BatchDownloader, NameAllocator};
use crate::events::{ExportEvent, ExportEventSink};
use crate::gateway::{GatewayError, PostSource};
use crate::workspace::WorkingDirectory;

/// Run-level failures. Any of these means no artifact is offered.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The post list could not be fetched.
    #[error("failed to fetch posts: {0}")]
    Gateway(#[from] GatewayError),

    /// The working directory could not be created.
    #[error("failed to create working directory: {0}")]
    Workspace(#[source] std::io::Error),

    /// Packaging failed, including the case where every download failed.
    #[error("failed to build archive: {0}")]
    Archive(#[from] ArchiveError),

    /// The packaging task panicked or was cancelled.
    #[error("packaging task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The finished archive could not be copied to its destination.
    #[error("failed to deliver archive to {path}: {source}")]
    Delivery {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The platform returned no posts; nothing was downloaded or packaged.
    NoItems,
    /// The archive is built and ready for delivery.
    Ready(ExportArtifact),
}

/// A finished archive, still inside the run's working directory.
///
/// Dropping the artifact removes the working directory and everything in it;
/// [`deliver_to`](Self::deliver_to) copies the archive out first.
#[derive(Debug)]
pub struct ExportArtifact {
    workdir: WorkingDirectory,
    archive: ArchiveSummary,
    downloaded: usize,
    failed: usize,
}

impl ExportArtifact {
    /// Path of the archive inside the working directory.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive.path
    }

    /// File name the archive is offered under.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        OFFERED_FILE_NAME
    }

    /// MIME type of the archive.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        ARCHIVE_MIME_TYPE
    }

    /// Archive size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.archive.size_bytes
    }

    /// Number of media files in the archive.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Number of posts whose media could not be downloaded.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Whether some posts are missing from the archive.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }

    /// Working directory holding the archive and the downloaded media.
    #[must_use]
    pub fn working_directory(&self) -> &WorkingDirectory {
        &self.workdir
    }

    /// Copies the archive into `dir` as `media_files.zip` and releases the
    /// working directory.
    ///
    /// An existing `media_files.zip` is kept; the copy then gets the next free
    /// name (`media_files_1.zip`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the copy fails.
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub async fn deliver_to(self, dir: &Path) -> Result<PathBuf, ExportError> {
        let (stem, extension) = OFFERED_FILE_NAME
            .rsplit_once('.')
            .unwrap_or((OFFERED_FILE_NAME, ""));
        let destination = NameAllocator::new(dir).allocate_path(stem, extension);

        tokio::fs::copy(self.archive_path(), &destination)
            .await
            .map_err(|source| ExportError::Delivery {
                path: destination.clone(),
                source,
            })?;

        info!(path = %destination.display(), bytes = self.size_bytes(), "archive delivered");
        Ok(destination)
    }
}

/// One-shot export pipeline.
pub struct ExportPipeline {
    source: Arc<dyn PostSource>,
    downloader: BatchDownloader,
    work_parent: Option<PathBuf>,
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("downloader", &self.downloader)
            .field("work_parent", &self.work_parent)
            .finish_non_exhaustive()
    }
}

impl ExportPipeline {
    /// Creates a pipeline reading posts from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn PostSource>, downloader: BatchDownloader) -> Self {
        Self {
            source,
            downloader,
            work_parent: None,
        }
    }

    /// Places working directories under `dir` instead of the system temp location.
    #[must_use]
    pub fn with_work_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_parent = Some(dir.into());
        self
    }

    /// Runs one export: fetch `count` posts, download, package.
    ///
    /// Progress goes to `sink`. Downloads only start after the post list
    /// arrives, and packaging only starts after every download has finished.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Gateway`] if the post list cannot be fetched
    /// - [`ExportError::Archive`] with [`ArchiveError::EmptyInput`] if every
    ///   download failed, or another archive error if packaging failed
    /// - [`ExportError::Workspace`] / [`ExportError::Task`] on local failures
    ///
    /// The working directory is removed on every error path.
    #[instrument(skip(self, sink))]
    pub async fn run(
        &self,
        count: u32,
        sink: &Arc<dyn ExportEventSink>,
    ) -> Result<ExportOutcome, ExportError> {
        let items = self.source.fetch_posts(count).await?;
        if items.is_empty() {
            info!("no posts found");
            return Ok(ExportOutcome::NoItems);
        }
        info!(posts = items.len(), "fetched posts, starting downloads");
        sink.emit(ExportEvent::PostsFetched { count: items.len() });

        let workdir = match &self.work_parent {
            Some(parent) => WorkingDirectory::create_in(parent),
            None => WorkingDirectory::create(),
        }
        .map_err(ExportError::Workspace)?;

        let allocator = Arc::new(NameAllocator::new(workdir.media_dir()));
        let report = self.downloader.download_all(items, &allocator, sink).await;
        let failed = report.failure_count();
        let paths = report.into_successful_paths();

        if paths.is_empty() {
            warn!(failed, "no files were successfully downloaded");
            return Err(ExportError::Archive(ArchiveError::EmptyInput));
        }

        let downloaded = paths.len();
        sink.emit(ExportEvent::Packaging { files: downloaded });
        let archive_path = workdir.archive_path();
        let archive =
            tokio::task::spawn_blocking(move || build_archive(&paths, &archive_path)).await??;

        sink.emit(ExportEvent::ArchiveReady {
            path: archive.path.clone(),
            size_bytes: archive.size_bytes,
        });

        Ok(ExportOutcome::Ready(ExportArtifact {
            workdir,
            archive,
            downloaded,
            failed,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::download::MediaFetcher;
    use crate::events::{ChannelSink, NoopSink};
    use crate::item::ItemDescriptor;

    struct FixedSource(Vec<ItemDescriptor>);

    #[async_trait]
    impl PostSource for FixedSource {
        async fn fetch_posts(&self, count: u32) -> Result<Vec<ItemDescriptor>, GatewayError> {
            crate::gateway::validate_count(count)?;
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PostSource for FailingSource {
        async fn fetch_posts(&self, _count: u32) -> Result<Vec<ItemDescriptor>, GatewayError> {
            Err(GatewayError::http_status("https://api.example.com/graphql", 500))
        }
    }

    fn pipeline(source: impl PostSource + 'static, parent: &Path) -> ExportPipeline {
        let downloader = BatchDownloader::new(4, MediaFetcher::new().unwrap()).unwrap();
        ExportPipeline::new(Arc::new(source), downloader).with_work_parent(parent)
    }

    fn noop() -> Arc<dyn ExportEventSink> {
        Arc::new(NoopSink)
    }

    #[tokio::test]
    async fn test_run_no_items_creates_no_working_directory() {
        let parent = tempfile::TempDir::new().unwrap();
        let (sink, mut rx) = ChannelSink::new();
        let sink: Arc<dyn ExportEventSink> = Arc::new(sink);

        let outcome = pipeline(FixedSource(Vec::new()), parent.path())
            .run(10, &sink)
            .await
            .unwrap();

        assert!(matches!(outcome, ExportOutcome::NoItems));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
        drop(sink);
        assert!(rx.recv().await.is_none(), "no events for an empty run");
    }

    #[tokio::test]
    async fn test_run_gateway_error_is_fatal() {
        let parent = tempfile::TempDir::new().unwrap();

        let result = pipeline(FailingSource, parent.path()).run(10, &noop()).await;

        assert!(matches!(
            result,
            Err(ExportError::Gateway(GatewayError::HttpStatus { status: 500, .. }))
        ));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_invalid_count_is_rejected() {
        let parent = tempfile::TempDir::new().unwrap();
        let result = pipeline(FixedSource(Vec::new()), parent.path())
            .run(0, &noop())
            .await;
        assert!(matches!(
            result,
            Err(ExportError::Gateway(GatewayError::InvalidCount { count: 0 }))
        ));
    }

    #[tokio::test]
    async fn test_run_all_failures_reports_empty_input_and_cleans_up() {
        let parent = tempfile::TempDir::new().unwrap();
        let items = vec![
            ItemDescriptor::new("not-a-url", None, "a").unwrap(),
            ItemDescriptor::new("still-not-a-url", None, "b").unwrap(),
        ];

        let result = pipeline(FixedSource(items), parent.path())
            .run(2, &noop())
            .await;

        assert!(matches!(
            result,
            Err(ExportError::Archive(ArchiveError::EmptyInput))
        ));
        assert_eq!(
            std::fs::read_dir(parent.path()).unwrap().count(),
            0,
            "working directory must be removed after an aborted run"
        );
    }
}
