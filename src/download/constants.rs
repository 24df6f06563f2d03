//! Constants for the download module (timeouts, chunking, concurrency).

/// Default per-request connect and read timeout for media fetches (10 seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Size of each write to disk while streaming a media body.
pub const WRITE_CHUNK_SIZE: usize = 1024;

/// Default number of simultaneous in-flight fetches.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;
