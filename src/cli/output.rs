//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::FileHandle;
use crate::error::Error;
use crate::session::LoadReport;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the result of a load command.
#[must_use]
pub fn format_load(report: Option<&LoadReport>, format: OutputFormat) -> String {
    match (report, format) {
        (None, OutputFormat::Text) => "No file selected.\n".to_string(),
        (Some(report), OutputFormat::Text) => format_load_text(report),
        (report, OutputFormat::Json) => format_json(&report),
    }
}

fn format_load_text(report: &LoadReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Loaded: {}", report.file.name);
    let _ = writeln!(output, "  Size:       {}", format_size(report.file.size));
    if let (Some(first), Some(last)) = (report.file.first_byte, report.file.last_byte) {
        let _ = writeln!(output, "  First byte: {first:#04x}");
        let _ = writeln!(output, "  Last byte:  {last:#04x}");
    }
    output.push('\n');
    output.push_str(&report.module_report);
    if !report.module_report.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Formats a file handle.
#[must_use]
pub fn format_handle(handle: &FileHandle, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "File: {}", handle.name());
            let _ = writeln!(output, "  Size:     {} bytes", handle.size());
            let _ = writeln!(output, "  Location: {}", handle.location().display());
            output
        }
        OutputFormat::Json => format_json(handle),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a byte size as human-readable.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
