use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use media_export::{
    ArchiveError, BatchDownloader, ExportError, ExportEventSink, ExportOutcome, ExportPipeline,
    GraphqlGateway, MediaFetcher,
};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::progress_manager::ConsoleSink;
use crate::app::{config_manager, config_runtime, exit_handler, terminal};

pub(crate) async fn run_export() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(args, &cli_sources)?;
    let args = resolved.args;

    let default_level = config_runtime::resolve_default_log_level(&args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let dumb_terminal = terminal::is_dumb_terminal();
    let no_color = terminal::no_color_env_requested() || dumb_terminal;
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(
        ?args,
        config = ?resolved.loaded_from,
        verbosity = config_runtime::verbosity_label(args.verbose, args.quiet),
        "configuration resolved"
    );
    info!(endpoint = %args.endpoint, count = args.count, "media export starting");

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                args.output_dir.display()
            )
        })?;

    let gateway =
        GraphqlGateway::new(args.endpoint.as_str()).context("Failed to create GraphQL client")?;
    let fetcher = MediaFetcher::with_timeout(Duration::from_secs(args.timeout))
        .context("Failed to create download client")?;
    let downloader = BatchDownloader::new(usize::from(args.concurrency), fetcher)?;
    let pipeline = ExportPipeline::new(Arc::new(gateway), downloader);

    let use_progress_bar = terminal::should_use_progress_bar(
        io::stderr().is_terminal(),
        args.quiet,
        args.no_progress,
        dumb_terminal,
    );
    let console = Arc::new(ConsoleSink::new(use_progress_bar, args.quiet));
    let sink: Arc<dyn ExportEventSink> = console.clone();

    let outcome = pipeline.run(args.count, &sink).await;
    console.finish();

    let artifact = match outcome {
        Ok(ExportOutcome::NoItems) => {
            console.line("No posts found.");
            return Ok(ProcessExit::Success);
        }
        Ok(ExportOutcome::Ready(artifact)) => artifact,
        Err(ExportError::Archive(ArchiveError::EmptyInput)) => {
            bail!("No files were successfully downloaded.")
        }
        Err(error) => return Err(error).context("Export failed"),
    };

    let archived = artifact.downloaded();
    let failed = artifact.failed();
    let size_bytes = artifact.size_bytes();
    let mime_type = artifact.mime_type();
    let destination = artifact.deliver_to(&args.output_dir).await?;

    info!(
        path = %destination.display(),
        archived,
        failed,
        size_bytes,
        mime_type,
        "export complete"
    );
    console.line(&format!(
        "Saved {} ({archived} files, {size_bytes} bytes)",
        destination.display()
    ));
    if failed > 0 {
        console.line(&format!(
            "{failed} of {} items could not be downloaded",
            archived + failed
        ));
    }

    Ok(exit_handler::determine_exit_outcome(archived, failed))
}
