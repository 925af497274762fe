//! Local filesystem read platform.

use crate::config::IngestConfig;
use crate::core::FileHandle;
use crate::io::platform::{ReadControl, ReadPlatform, ReadSink};
use crate::io::reader::FileReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reads files from disk on the blocking thread pool.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPlatform {
    config: IngestConfig,
}

impl FsPlatform {
    /// Creates a platform with the given read tunables.
    #[must_use]
    pub const fn new(config: IngestConfig) -> Self {
        Self { config }
    }
}

impl ReadPlatform for FsPlatform {
    fn begin_read(&self, handle: &FileHandle, sink: ReadSink) -> Box<dyn ReadControl> {
        let aborted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&aborted);
        let location = handle.location().to_path_buf();
        let expected = handle.size();
        let config = self.config;

        tokio::task::spawn_blocking(move || {
            let result = FileReader::open(&location, config)
                .and_then(|reader| reader.read_to_bytes(expected, &flag));
            match result {
                Ok(bytes) => sink.on_load(bytes),
                Err(err) => sink.on_error(err),
            }
        });

        Box::new(AbortFlag(aborted))
    }
}

struct AbortFlag(Arc<AtomicBool>);

impl ReadControl for AbortFlag {
    fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }
}
