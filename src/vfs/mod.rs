//! Sandboxed filesystems that trees are synchronized into and read back
//! from.

mod dir_fs;
mod memory_fs;
mod virtual_fs;

pub use dir_fs::DirFs;
pub use memory_fs::MemoryFs;
pub use virtual_fs::{DirEntry, EntryKind, MkdirOptions, RmOptions, VfsError, VirtualFs};
