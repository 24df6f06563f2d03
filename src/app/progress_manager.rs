//! Console progress for export runs.
//!
//! [`ConsoleSink`] is the CLI's [`ExportEventSink`]: it prints one line per
//! event and, on an interactive terminal, drives an indicatif progress bar
//! over the download phase.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use media_export::{ExportEvent, ExportEventSink};
use tracing::debug;

pub(crate) struct ConsoleSink {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ConsoleSink {
    pub(crate) fn new(use_progress_bar: bool, quiet: bool) -> Self {
        let bar = use_progress_bar.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar
        });
        Self::with_bar(bar, quiet)
    }

    fn with_bar(bar: Option<ProgressBar>, quiet: bool) -> Self {
        Self { bar, quiet }
    }

    /// Prints a line without tearing the progress bar.
    pub(crate) fn line(&self, message: &str) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{message}")),
            None => println!("{message}"),
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

impl ExportEventSink for ConsoleSink {
    fn emit(&self, event: ExportEvent) {
        match event {
            ExportEvent::PostsFetched { count } => {
                if let Some(bar) = &self.bar {
                    bar.set_length(count as u64);
                    bar.set_position(0);
                    bar.set_message("downloading");
                    bar.enable_steady_tick(Duration::from_millis(100));
                }
                self.line(&format!("Fetched {count} posts"));
            }
            ExportEvent::ItemDownloaded { file_name } => {
                self.advance();
                self.line(&format!("Downloaded: {file_name}"));
            }
            ExportEvent::ItemFailed { url, reason } => {
                self.advance();
                debug!(url = %url, reason = %reason, "item failed");
                self.line("Failed to download a file");
            }
            ExportEvent::Packaging { files } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("packaging {files} files"));
                }
            }
            ExportEvent::ArchiveReady { .. } => self.finish(),
        }
    }
}
