//! Key-value store adapters.

mod atomic_io;
mod file;
mod memory;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
