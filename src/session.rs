//! Selection-to-module glue.
//!
//! A [`LoadSession`] reacts to a file selection: it ingests the selected
//! file, resolves the processing module, and hands the buffer over. Any
//! failure is reported to the [`Notifier`] once and returned to the caller.

use crate::core::{BufferSummary, FileHandle, FileSelection};
use crate::error::Result;
use crate::ingest::{CancelToken, FileIngestor};
use crate::loader::ModuleLoader;
use crate::notify::Notifier;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// The buffer handed to the module.
    pub file: BufferSummary,
    /// What the module reported back.
    pub module_report: String,
}

/// Wires ingestion, module loading, and failure reporting together.
pub struct LoadSession {
    ingestor: FileIngestor,
    loader: Arc<dyn ModuleLoader>,
    notifier: Arc<dyn Notifier>,
}

impl LoadSession {
    /// Creates a session.
    #[must_use]
    pub fn new(
        ingestor: FileIngestor,
        loader: Arc<dyn ModuleLoader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ingestor,
            loader,
            notifier,
        }
    }

    /// Handles one selection event.
    ///
    /// Returns `Ok(None)` without reading anything when the selection is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns the read, module, or consumer error after alerting the
    /// notifier.
    pub async fn on_selection(&self, selection: &FileSelection) -> Result<Option<LoadReport>> {
        self.on_selection_with_cancel(selection, &CancelToken::new())
            .await
    }

    /// Handles one selection event, stopping the read if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Same as [`on_selection`](Self::on_selection).
    pub async fn on_selection_with_cancel(
        &self,
        selection: &FileSelection,
        cancel: &CancelToken,
    ) -> Result<Option<LoadReport>> {
        let Some(handle) = selection.first() else {
            tracing::debug!("empty selection, nothing to read");
            return Ok(None);
        };
        if selection.len() > 1 {
            tracing::debug!(
                ignored = selection.len() - 1,
                "multiple files selected, using the first"
            );
        }

        let result = self.load(handle, cancel).await;

        match result {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                self.notifier.alert(&err.to_string());
                Err(err)
            }
        }
    }

    async fn load(&self, handle: &FileHandle, cancel: &CancelToken) -> Result<LoadReport> {
        let buffer = self.ingestor.ingest_with_cancel(handle, cancel).await?;
        let file = buffer.summary(handle.name());
        let module = self.loader.resolve().await?;
        let module_report = module.accept(buffer)?;
        Ok(LoadReport {
            file,
            module_report,
        })
    }
}
