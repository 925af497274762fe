//! # ROM ingest
//!
//! Loads a user-selected ROM image into memory and hands it to a lazily
//! resolved emulator module.
//!
//! ## Features
//!
//! - **Single-shot reads**: every ingestion settles exactly once
//! - **Cancellation**: in-flight reads can be aborted through a token
//! - **Pluggable platforms**: filesystem or in-memory
//! - **Lazy modules**: the consumer is resolved only after a successful read

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ingest;
pub mod io;
pub mod loader;
pub mod notify;
pub mod session;

// Re-export commonly used types at crate root
pub use error::{Error, FailureReason, ReadFailure, Result};

// Re-export core domain types
pub use crate::core::{BufferSummary, ByteBuffer, FileHandle, FileSelection};

// Re-export ingestion types
pub use config::IngestConfig;
pub use ingest::{CancelToken, FileIngestor};
pub use io::{Behavior, FsPlatform, MemoryPlatform, ReadControl, ReadPlatform, ReadSink};

// Re-export module and session types
pub use loader::{CartridgeConsumer, LazyModule, ModuleLoader, RomConsumer};
pub use notify::{LogNotifier, Notifier, StderrNotifier};
pub use session::{LoadReport, LoadSession};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
