//! Media Export Core Library
//!
//! This library provides the core functionality for the media export tool,
//! which pulls the most recent media posts from a content platform, downloads
//! the referenced files concurrently, and packages them into one zip archive.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`gateway`] - GraphQL query for the post list
//! - [`download`] - Name allocation, streaming fetcher and the concurrent batch engine
//! - [`archive`] - Zip packaging of the successful downloads
//! - [`workspace`] - Scoped per-run working directory
//! - [`pipeline`] - End-to-end export run wiring the above together
//! - [`events`] - Progress events delivered to the front end

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod download;
pub mod events;
pub mod gateway;
mod http;
pub mod item;
pub mod pipeline;
mod user_agent;
pub mod workspace;

// Re-export commonly used types
pub use archive::{ARCHIVE_MIME_TYPE, ArchiveError, ArchiveSummary, build_archive};
pub use download::{
    BatchDownloader, BatchReport, DEFAULT_CONCURRENCY, DownloadOutcome, EngineError, FetchError,
    MediaFetcher, NameAllocator,
};
pub use events::{ChannelSink, ExportEvent, ExportEventSink, NoopSink};
pub use gateway::{
    DEFAULT_ENDPOINT, GatewayError, GraphqlGateway, MAX_POST_COUNT, MIN_POST_COUNT, PostSource,
};
pub use item::{DEFAULT_MEDIA_EXTENSION, ItemDescriptor};
pub use pipeline::{ExportArtifact, ExportError, ExportOutcome, ExportPipeline};
pub use workspace::WorkingDirectory;
