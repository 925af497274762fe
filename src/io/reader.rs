//! Blocking file reading.
//!
//! Reads a whole file into memory in blocks, checking an abort flag
//! between blocks so an in-flight read can be stopped. Reading stops one
//! byte past the expected size, so a file that grew after selection is
//! never pulled into memory whole.

use crate::config::IngestConfig;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// File reader that can be interrupted between blocks.
///
/// # Examples
///
/// ```no_run
/// use rom_ingest::config::IngestConfig;
/// use rom_ingest::io::FileReader;
/// use std::sync::atomic::AtomicBool;
///
/// let reader = FileReader::open("game.nes", IngestConfig::default()).unwrap();
/// let bytes = reader
///     .read_to_bytes(reader.size(), &AtomicBool::new(false))
///     .unwrap();
/// assert_eq!(bytes.len() as u64, reader.size());
/// ```
pub struct FileReader {
    /// File handle.
    file: File,
    /// File size in bytes at open time.
    size: u64,
    /// Read tunables.
    config: IngestConfig,
}

impl FileReader {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the file can't be opened or inspected.
    pub fn open<P: AsRef<Path>>(path: P, config: IngestConfig) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self { file, size, config })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Reads the file, expecting `expected` bytes.
    ///
    /// At most `expected + 1` bytes are read. A shorter or longer result
    /// means the file changed since its size was taken.
    ///
    /// # Errors
    ///
    /// Returns the platform error if reading fails, or an
    /// [`io::ErrorKind::Interrupted`] error once `abort` is set.
    pub fn read_to_bytes(&self, expected: u64, abort: &AtomicBool) -> io::Result<Vec<u8>> {
        let mut file = (&self.file).take(expected.saturating_add(1));
        let mut buffer = Vec::with_capacity(usize::try_from(expected).unwrap_or_default());
        let mut block = vec![0u8; self.config.block_size];

        loop {
            check_abort(abort)?;
            match file.read(&mut block) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&block[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(buffer)
    }
}

fn check_abort(abort: &AtomicBool) -> io::Result<()> {
    if abort.load(Ordering::Acquire) {
        Err(io::Error::new(io::ErrorKind::Interrupted, "read aborted"))
    } else {
        Ok(())
    }
}
