//! The callback-driven read primitive.
//!
//! A [`ReadPlatform`] starts a read and reports back through a [`ReadSink`]
//! by calling either [`ReadSink::on_load`] or [`ReadSink::on_error`]. The
//! sink keeps only the first report; anything arriving later is dropped.
//! The returned [`ReadControl`] stops an in-flight read.

use crate::core::FileHandle;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Starts reads and reports their completion through callbacks.
///
/// Implementations must eventually call one of the sink callbacks or drop
/// every clone of the sink. Dropping the sink without a report counts as an
/// aborted read.
pub trait ReadPlatform: Send + Sync {
    /// Begins reading the whole content of `handle`.
    fn begin_read(&self, handle: &FileHandle, sink: ReadSink) -> Box<dyn ReadControl>;
}

/// Control over one in-flight read.
pub trait ReadControl: Send + Sync {
    /// Stops the read. No further progress is made afterwards.
    fn abort(&self);
}

/// What a platform reported for a read.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    Loaded(Vec<u8>),
    Failed(io::Error),
}

/// Receives the completion callbacks of one read.
///
/// Clones share the same settlement slot: whichever callback fires first
/// settles the read, and every later call is ignored.
#[derive(Debug, Clone)]
pub struct ReadSink {
    inner: Arc<SinkInner>,
}

#[derive(Debug)]
struct SinkInner {
    name: String,
    tx: Mutex<Option<oneshot::Sender<ReadOutcome>>>,
}

impl ReadSink {
    pub(crate) fn channel(name: &str) -> (Self, oneshot::Receiver<ReadOutcome>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            inner: Arc::new(SinkInner {
                name: name.to_string(),
                tx: Mutex::new(Some(tx)),
            }),
        };
        (sink, rx)
    }

    /// Reports the full content of the file.
    pub fn on_load(&self, bytes: Vec<u8>) {
        self.settle(ReadOutcome::Loaded(bytes));
    }

    /// Reports a read error.
    pub fn on_error(&self, err: io::Error) {
        self.settle(ReadOutcome::Failed(err));
    }

    /// Returns true once a callback has fired.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        match self.inner.tx.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    fn settle(&self, outcome: ReadOutcome) {
        let sender = match self.inner.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match sender {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    tracing::debug!(
                        file = %self.inner.name,
                        "read settled after caller stopped waiting"
                    );
                }
            }
            None => {
                let kind = match outcome {
                    ReadOutcome::Loaded(_) => "load",
                    ReadOutcome::Failed(_) => "error",
                };
                tracing::warn!(
                    file = %self.inner.name,
                    kind,
                    "ignoring callback for a read that already settled"
                );
            }
        }
    }
}
