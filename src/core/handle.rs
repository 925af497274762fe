//! File handles and selections.
//!
//! A [`FileHandle`] is an unread reference to a user-selected file. A
//! [`FileSelection`] is what one user interaction produces: usually one
//! handle, sometimes none.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Opaque reference to a user-selected file whose content is not yet read.
///
/// # Examples
///
/// ```
/// use rom_ingest::core::FileHandle;
///
/// let handle = FileHandle::new("rom.bin", 32768, "/roms/rom.bin");
/// assert_eq!(handle.name(), "rom.bin");
/// assert_eq!(handle.size(), 32768);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    name: String,
    size: u64,
    location: PathBuf,
}

impl FileHandle {
    /// Creates a handle from already-known attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            location: location.into(),
        }
    }

    /// Builds a handle by inspecting a file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be inspected, or is
    /// not a regular file.
    pub fn stat<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        if !path_ref.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }

        let metadata = std::fs::metadata(path_ref).map_err(|e| IoError::StatFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        if !metadata.is_file() {
            return Err(IoError::NotAFile { path: path_str }.into());
        }

        let name = path_ref
            .file_name()
            .map_or_else(|| path_str.clone(), |n| n.to_string_lossy().to_string());

        Ok(Self::new(name, metadata.len(), path_ref))
    }

    /// Returns the file name as shown to the user.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns where the platform finds the content.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// The handles produced by a single selection event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    handles: Vec<FileHandle>,
}

impl FileSelection {
    /// A selection where the user picked nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Wraps a list of handles.
    #[must_use]
    pub const fn from_handles(handles: Vec<FileHandle>) -> Self {
        Self { handles }
    }

    /// Returns the handle to ingest, if any.
    ///
    /// Only the first handle of a multi-file selection is used.
    #[must_use]
    pub fn first(&self) -> Option<&FileHandle> {
        self.handles.first()
    }

    /// Returns the number of handles in the selection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl From<FileHandle> for FileSelection {
    fn from(handle: FileHandle) -> Self {
        Self {
            handles: vec![handle],
        }
    }
}
