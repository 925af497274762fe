//! Ingestion configuration.

use crate::error::{Error, Result};

/// Maximum file size to read into memory (1GB).
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1024;

/// Number of bytes read between abort checks (64KB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Tunables for reading files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Files larger than this are rejected before reading.
    pub max_size: u64,
    /// Bytes read between abort checks.
    pub block_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl IngestConfig {
    /// Sets the maximum file size.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Sets the read block size.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::Config {
                message: "max size must be greater than zero".to_string(),
            });
        }
        if self.block_size == 0 {
            return Err(Error::Config {
                message: "block size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
