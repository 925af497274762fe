//! State of a single in-flight read.

use crate::core::{ByteBuffer, FileHandle};
use crate::error::{FailureReason, ReadFailure};
use crate::io::platform::{ReadControl, ReadPlatform, ReadSink};

/// One read, from `begin_read` until it settles.
///
/// Created fresh for every ingestion and consumed when it settles. Abort is
/// forwarded to the platform at most once. Dropping an unsettled operation
/// aborts the read.
pub(crate) struct ReadOperation {
    name: String,
    expected: u64,
    control: Box<dyn ReadControl>,
    aborted: bool,
    settled: bool,
}

impl ReadOperation {
    pub(crate) fn start(platform: &dyn ReadPlatform, handle: &FileHandle, sink: ReadSink) -> Self {
        tracing::debug!(file = handle.name(), size = handle.size(), "starting read");
        let control = platform.begin_read(handle, sink);
        Self {
            name: handle.name().to_string(),
            expected: handle.size(),
            control,
            aborted: false,
            settled: false,
        }
    }

    pub(crate) fn abort(&mut self) {
        if self.aborted {
            return;
        }
        self.aborted = true;
        tracing::debug!(file = %self.name, "aborting read");
        self.control.abort();
    }

    /// Turns delivered bytes into a buffer, enforcing the declared size.
    pub(crate) fn complete(mut self, bytes: Vec<u8>) -> Result<ByteBuffer, ReadFailure> {
        self.settled = true;
        let actual = bytes.len() as u64;
        if actual != self.expected {
            return Err(self.fail(FailureReason::SizeMismatch {
                expected: self.expected,
                actual,
            }));
        }
        tracing::debug!(file = %self.name, size = actual, "read complete");
        Ok(ByteBuffer::from(bytes))
    }

    pub(crate) fn fail(&mut self, reason: FailureReason) -> ReadFailure {
        self.settled = true;
        tracing::debug!(file = %self.name, %reason, "read failed");
        ReadFailure::new(self.name.clone(), reason)
    }
}

impl Drop for ReadOperation {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(file = %self.name, "read dropped before settling");
            self.abort();
        }
    }
}
