//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::IngestConfig;
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rom-ingest: load a ROM image and hand it to the emulator module.
#[derive(Parser, Debug)]
#[command(name = "rom-ingest")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Largest file accepted, in bytes.
    #[arg(long, env = "ROM_INGEST_MAX_SIZE", global = true)]
    pub max_size: Option<u64>,

    /// Bytes read between abort checks.
    #[arg(long, env = "ROM_INGEST_BLOCK_SIZE", global = true)]
    pub block_size: Option<usize>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a selected ROM and load it into the emulator module.
    ///
    /// Only the first file is checked and read. With no files, nothing
    /// happens.
    Load {
        /// Selected files.
        files: Vec<PathBuf>,
    },

    /// Show what would be read, without reading it.
    Info {
        /// Path to the file.
        file: PathBuf,
    },
}

impl Cli {
    /// Builds the ingestion configuration from flags and environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a value is out of range.
    pub fn ingest_config(&self) -> Result<IngestConfig> {
        let mut config = IngestConfig::default();
        if let Some(max_size) = self.max_size {
            config = config.with_max_size(max_size);
        }
        if let Some(block_size) = self.block_size {
            config = config.with_block_size(block_size);
        }
        config.validate()?;
        Ok(config)
    }
}
