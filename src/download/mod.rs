//! Concurrent media download pipeline.
//!
//! This module turns a list of item descriptors into files on disk:
//!
//! - [`NameAllocator`] picks a collision-free local name per item
//! - [`MediaFetcher`] streams one media URL to disk under a timeout
//! - [`BatchDownloader`] runs the fetcher over the whole list with bounded
//!   concurrency and aggregates the successes
//!
//! Per-item failures never abort the batch; they are counted in the
//! [`BatchReport`] and reported as progress events.

mod constants;
mod engine;
mod error;
mod fetcher;
mod naming;

pub use constants::{
    DEFAULT_CONCURRENCY, FETCH_TIMEOUT_SECS, MAX_CONCURRENCY, MIN_CONCURRENCY, WRITE_CHUNK_SIZE,
};
pub use engine::{BatchDownloader, BatchReport, DownloadOutcome, EngineError};
pub use error::FetchError;
pub use fetcher::MediaFetcher;
pub use naming::NameAllocator;
