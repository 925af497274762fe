//! CLI layer for rom-ingest.
//!
//! Provides the command-line interface using clap: a file selection comes
//! in as paths, and the load result or error goes out as text or JSON.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
