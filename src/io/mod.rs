//! Read platforms.
//!
//! Defines the callback-driven read primitive and two implementations: a
//! local filesystem platform reading on the blocking pool, and an in-memory
//! platform with scripted outcomes.

pub mod fs;
pub mod memory;
pub mod platform;
pub mod reader;

pub use fs::FsPlatform;
pub use memory::{Behavior, MemoryPlatform};
pub use platform::{ReadControl, ReadPlatform, ReadSink};
pub use reader::FileReader;
