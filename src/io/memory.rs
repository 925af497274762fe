//! In-memory read platform.
//!
//! Serves files registered up front, each with a scripted [`Behavior`]
//! describing how its read ends. Completion is always delivered from a
//! spawned task, never from inside `begin_read`. Aborts are counted per file
//! so callers can check how a read was torn down.

use crate::core::FileHandle;
use crate::io::platform::{ReadControl, ReadPlatform, ReadSink};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// How a read of a registered file ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Delivers the full content.
    Complete,
    /// Reports an error of the given kind without delivering anything.
    Fail(io::ErrorKind),
    /// Reads the given number of bytes, then loses access to the storage.
    RevokeAfter(usize),
    /// Never completes; waits until aborted.
    Hang,
    /// Delivers the content, then reports an error as well.
    DoubleFire,
    /// Drops the callbacks without reporting anything.
    Drop,
}

#[derive(Debug)]
struct Entry {
    bytes: Arc<[u8]>,
    behavior: Behavior,
    aborts: Arc<AtomicUsize>,
}

/// A [`ReadPlatform`] over registered in-memory files.
///
/// # Examples
///
/// ```
/// use rom_ingest::io::MemoryPlatform;
///
/// let mut platform = MemoryPlatform::new();
/// let handle = platform.insert("roms/rom.bin", vec![0u8; 16]);
/// assert_eq!(handle.size(), 16);
/// assert_eq!(platform.abort_count("roms/rom.bin"), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    entries: HashMap<PathBuf, Entry>,
}

impl MemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file that reads successfully and returns its handle.
    pub fn insert(&mut self, location: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) -> FileHandle {
        self.insert_with(location, bytes, Behavior::Complete)
    }

    /// Registers a file with a scripted behaviour and returns its handle.
    pub fn insert_with(
        &mut self,
        location: impl AsRef<Path>,
        bytes: impl Into<Vec<u8>>,
        behavior: Behavior,
    ) -> FileHandle {
        let location = location.as_ref().to_path_buf();
        let bytes: Vec<u8> = bytes.into();
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let name = location.file_name().map_or_else(
            || location.to_string_lossy().to_string(),
            |n| n.to_string_lossy().to_string(),
        );
        let handle = FileHandle::new(name, bytes.len() as u64, &location);

        self.entries.insert(
            location,
            Entry {
                bytes,
                behavior,
                aborts: Arc::new(AtomicUsize::new(0)),
            },
        );
        handle
    }

    /// Returns how many times reads of `location` were aborted.
    #[must_use]
    pub fn abort_count(&self, location: impl AsRef<Path>) -> usize {
        self.entries
            .get(location.as_ref())
            .map_or(0, |entry| entry.aborts.load(Ordering::Acquire))
    }
}

impl ReadPlatform for MemoryPlatform {
    fn begin_read(&self, handle: &FileHandle, sink: ReadSink) -> Box<dyn ReadControl> {
        let aborted = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());

        let Some(entry) = self.entries.get(handle.location()) else {
            let location = handle.location().display().to_string();
            tokio::spawn(async move {
                sink.on_error(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {location}"),
                ));
            });
            return Box::new(MemoryControl {
                aborted,
                wake,
                aborts: Arc::new(AtomicUsize::new(0)),
            });
        };

        let control = MemoryControl {
            aborted: Arc::clone(&aborted),
            wake: Arc::clone(&wake),
            aborts: Arc::clone(&entry.aborts),
        };
        let bytes = Arc::clone(&entry.bytes);
        let behavior = entry.behavior;

        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if aborted.load(Ordering::Acquire) {
                return;
            }

            match behavior {
                Behavior::Complete => sink.on_load(bytes.to_vec()),
                Behavior::Fail(kind) => sink.on_error(io::Error::new(kind, "simulated read error")),
                Behavior::RevokeAfter(n) => {
                    let partial = bytes[..n.min(bytes.len())].to_vec();
                    tokio::task::yield_now().await;
                    tracing::debug!(read = partial.len(), "storage revoked mid-read");
                    sink.on_error(io::Error::new(
                        io::ErrorKind::NotFound,
                        "storage revoked during read",
                    ));
                }
                Behavior::Hang => wake.notified().await,
                Behavior::DoubleFire => {
                    sink.on_load(bytes.to_vec());
                    sink.on_error(io::Error::other("error after completion"));
                }
                Behavior::Drop => drop(sink),
            }
        });

        Box::new(control)
    }
}

struct MemoryControl {
    aborted: Arc<AtomicBool>,
    wake: Arc<Notify>,
    aborts: Arc<AtomicUsize>,
}

impl ReadControl for MemoryControl {
    fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        self.aborts.fetch_add(1, Ordering::AcqRel);
        self.wake.notify_one();
    }
}
