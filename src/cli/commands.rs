//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{OutputFormat, format_handle, format_load};
use crate::cli::parser::{Cli, Commands};
use crate::config::IngestConfig;
use crate::core::{FileHandle, FileSelection};
use crate::error::{CommandError, Error, Result};
use crate::ingest::{CancelToken, FileIngestor};
use crate::loader::{CartridgeConsumer, LazyModule, RomConsumer};
use crate::notify::{LogNotifier, Notifier, StderrNotifier};
use crate::session::LoadSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let config = cli.ingest_config()?;

    match &cli.command {
        Commands::Load { files } => cmd_load(files, config, format),
        Commands::Info { file } => cmd_info(file, format),
    }
}

/// Picks where load failures are shown.
///
/// Text errors already reach stderr through `main`, so alerts only go to the
/// log there. JSON errors are written to stdout, so the alert goes to stderr.
fn notifier_for(format: OutputFormat) -> Arc<dyn Notifier> {
    match format {
        OutputFormat::Text => Arc::new(LogNotifier),
        OutputFormat::Json => Arc::new(StderrNotifier),
    }
}

fn cmd_load(files: &[PathBuf], config: IngestConfig, format: OutputFormat) -> Result<String> {
    let notifier = notifier_for(format);
    let selection = match files.first() {
        Some(path) => FileSelection::from(FileHandle::stat(path).inspect_err(|err| {
            notifier.alert(&err.to_string());
        })?),
        None => FileSelection::empty(),
    };
    if files.len() > 1 {
        tracing::debug!(ignored = files.len() - 1, "only the first selected file is read");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("failed to start runtime: {e}")))?;

    let report = runtime.block_on(async {
        let ingestor = FileIngestor::filesystem(config)?;
        let module = LazyModule::new(|| async {
            Ok::<Arc<dyn RomConsumer>, Error>(Arc::new(CartridgeConsumer::new()))
        });
        let session = LoadSession::new(ingestor, Arc::new(module), notifier);

        let cancel = CancelToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::debug!("interrupt received, cancelling read");
                    cancel.cancel();
                }
            })
        };

        let result = session.on_selection_with_cancel(&selection, &cancel).await;
        interrupt.abort();
        result
    })?;

    Ok(format_load(report.as_ref(), format))
}

fn cmd_info(file: &Path, format: OutputFormat) -> Result<String> {
    let handle = FileHandle::stat(file)?;
    Ok(format_handle(&handle, format))
}
