//! User-facing failure notifications.

use std::io::{self, Write};

/// Terminal error surface shown to the user.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn alert(&self, message: &str);
}

/// Sends alerts to the log at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::error!(target: "rom_ingest::alert", "{message}");
    }
}

/// Prints alerts to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        if let Err(e) = write_alert(&mut io::stderr().lock(), message) {
            tracing::warn!(error = %e, "failed to write alert");
        }
    }
}

fn write_alert(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "Error: {message}")?;
    out.flush()
}
