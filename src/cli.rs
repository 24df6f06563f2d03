//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use media_export::download::FETCH_TIMEOUT_SECS;
use media_export::{DEFAULT_CONCURRENCY, DEFAULT_ENDPOINT};

/// Default number of posts requested.
pub(crate) const DEFAULT_POST_COUNT: u32 = 10;

/// Export the most recent media posts into one zip archive.
///
/// Fetches the latest posts from the platform, downloads every referenced
/// media file concurrently, and saves them together as `media_files.zip`.
#[derive(Parser, Debug, Clone)]
#[command(name = "media-export")]
#[command(author, version, about)]
pub struct Args {
    /// Number of recent posts to export (1-100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_POST_COUNT, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub count: u32,

    /// Directory the archive is saved to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// GraphQL endpoint serving the posts query
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-file connect and read timeout in seconds (1-3600)
    #[arg(short = 't', long, default_value_t = FETCH_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
