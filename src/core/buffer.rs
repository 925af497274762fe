//! Byte buffers produced by ingestion.
//!
//! A [`ByteBuffer`] holds the complete content of a file. It is only ever
//! created from a successful read, and its content cannot be changed
//! afterwards.

use serde::Serialize;
use std::ops::Deref;

/// Owned, immutable, contiguous file content.
///
/// # Examples
///
/// ```
/// use rom_ingest::core::ByteBuffer;
///
/// let buffer = ByteBuffer::from(vec![0x4e, 0x45, 0x53, 0x1a]);
/// assert_eq!(buffer.len(), 4);
/// assert_eq!(buffer.first(), Some(&0x4e));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Box<[u8]>,
}

impl ByteBuffer {
    /// Returns the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the buffer holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the content as a slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Gives the content back as a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    /// Summarizes the buffer for display.
    #[must_use]
    pub fn summary(&self, name: &str) -> BufferSummary {
        BufferSummary {
            name: name.to_string(),
            size: self.len(),
            first_byte: self.bytes.first().copied(),
            last_byte: self.bytes.last().copied(),
        }
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Display-oriented facts about a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSummary {
    /// File name the buffer was read from.
    pub name: String,
    /// Length in bytes.
    pub size: usize,
    /// First byte, if any.
    pub first_byte: Option<u8>,
    /// Last byte, if any.
    pub last_byte: Option<u8>,
}
