//! Core domain models.
//!
//! File handles, selections, and the byte buffers produced from them. These
//! are pure data types with no async or platform dependencies.

pub mod buffer;
pub mod handle;

pub use buffer::{BufferSummary, ByteBuffer};
pub use handle::{FileHandle, FileSelection};
