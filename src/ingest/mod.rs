//! File ingestion.
//!
//! [`FileIngestor`] turns a selected [`FileHandle`] into a [`ByteBuffer`].
//! Each call starts a fresh read on the configured [`ReadPlatform`] and
//! suspends until the platform reports back, then settles exactly once:
//!
//! - the first platform callback decides the outcome
//! - a platform error aborts the read before the call fails
//! - a [`CancelToken`] aborts the read and fails the call with
//!   [`FailureReason::Cancelled`]
//! - delivered content must match the size declared by the handle
//! - dropping the returned future aborts the read
//!
//! Concurrent calls share nothing but the platform.

mod cancel;
mod operation;

pub use cancel::CancelToken;

use crate::config::IngestConfig;
use crate::core::{ByteBuffer, FileHandle};
use crate::error::{FailureReason, ReadFailure, Result};
use crate::io::platform::{ReadOutcome, ReadPlatform, ReadSink};
use crate::io::FsPlatform;
use operation::ReadOperation;
use std::sync::Arc;

/// Reads selected files fully into memory.
///
/// # Examples
///
/// ```
/// use rom_ingest::ingest::FileIngestor;
/// use rom_ingest::io::MemoryPlatform;
/// use std::sync::Arc;
///
/// # tokio_test();
/// # fn tokio_test() {
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let mut platform = MemoryPlatform::new();
/// let handle = platform.insert("rom.bin", vec![0xea; 32768]);
///
/// let ingestor = FileIngestor::new(Arc::new(platform));
/// let buffer = ingestor.ingest(&handle).await.unwrap();
/// assert_eq!(buffer.len(), 32768);
/// # });
/// # }
/// ```
#[derive(Clone)]
pub struct FileIngestor {
    platform: Arc<dyn ReadPlatform>,
    config: IngestConfig,
}

impl FileIngestor {
    /// Creates an ingestor over `platform` with default limits.
    #[must_use]
    pub fn new(platform: Arc<dyn ReadPlatform>) -> Self {
        Self {
            platform,
            config: IngestConfig::default(),
        }
    }

    /// Creates an ingestor over `platform` with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn with_config(platform: Arc<dyn ReadPlatform>, config: IngestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { platform, config })
    }

    /// Creates an ingestor that reads from the local filesystem.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn filesystem(config: IngestConfig) -> Result<Self> {
        Self::with_config(Arc::new(FsPlatform::new(config)), config)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Reads `handle` fully into memory.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadFailure`] if the platform reports an error or drops
    /// the read, the file exceeds the configured maximum, or the content
    /// length differs from the handle's declared size.
    pub async fn ingest(
        &self,
        handle: &FileHandle,
    ) -> std::result::Result<ByteBuffer, ReadFailure> {
        self.ingest_with_cancel(handle, &CancelToken::new()).await
    }

    /// Reads `handle` fully into memory, stopping early if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Same as [`ingest`](Self::ingest), plus [`FailureReason::Cancelled`]
    /// when the token is cancelled before the read settles.
    pub async fn ingest_with_cancel(
        &self,
        handle: &FileHandle,
        cancel: &CancelToken,
    ) -> std::result::Result<ByteBuffer, ReadFailure> {
        if handle.size() > self.config.max_size {
            return Err(ReadFailure::new(
                handle.name(),
                FailureReason::TooLarge {
                    size: handle.size(),
                    max: self.config.max_size,
                },
            ));
        }
        if cancel.is_cancelled() {
            return Err(ReadFailure::new(handle.name(), FailureReason::Cancelled));
        }

        let (sink, rx) = ReadSink::channel(handle.name());
        let mut op = ReadOperation::start(self.platform.as_ref(), handle, sink);

        let outcome = tokio::select! {
            biased;
            outcome = rx => outcome,
            () = cancel.cancelled() => {
                op.abort();
                return Err(op.fail(FailureReason::Cancelled));
            }
        };

        match outcome {
            Ok(ReadOutcome::Loaded(bytes)) => op.complete(bytes),
            Ok(ReadOutcome::Failed(err)) => {
                op.abort();
                Err(op.fail(FailureReason::Platform(err)))
            }
            Err(_) => {
                op.abort();
                Err(op.fail(FailureReason::Aborted))
            }
        }
    }
}
