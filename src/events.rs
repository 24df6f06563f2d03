//! Progress events emitted by an export run.
//!
//! The pipeline never talks to the front end directly; it writes events to an
//! [`ExportEventSink`] and the front end decides how to present them (progress
//! bar, log lines, a channel feeding another task).

use std::path::PathBuf;

use tokio::sync::mpsc;

/// Observable milestones of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// The gateway returned the post list.
    PostsFetched {
        /// Number of item descriptors to download.
        count: usize,
    },
    /// One media file finished downloading.
    ItemDownloaded {
        /// Allocated local file name.
        file_name: String,
    },
    /// One media file could not be downloaded.
    ItemFailed {
        /// URL that failed.
        url: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// All downloads finished; packaging is about to start.
    Packaging {
        /// Number of files going into the archive.
        files: usize,
    },
    /// The archive is built and ready for delivery.
    ArchiveReady {
        /// Path of the archive inside the working directory.
        path: PathBuf,
        /// Archive size in bytes.
        size_bytes: u64,
    },
}

/// Receiver side of export progress.
///
/// Implementations must not block: events are emitted from download tasks.
pub trait ExportEventSink: Send + Sync {
    /// Emit one event.
    fn emit(&self, event: ExportEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ExportEventSink for NoopSink {
    fn emit(&self, _event: ExportEvent) {}
}

/// A sink forwarding events to an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ExportEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that observes its events.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ExportEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ExportEventSink for ChannelSink {
    fn emit(&self, event: ExportEvent) {
        // A closed receiver means nobody is watching; the run carries on.
        let _ = self.sender.send(event);
    }
}
