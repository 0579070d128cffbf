//! Handle sources: navigable trees of opaque file and directory references
//! that the tree builder walks.

mod handle;
mod local;
mod memory;
mod picker;

pub use handle::{FileSystemHandle, HandleError, HandleKind};
pub use local::LocalHandle;
pub use memory::MemoryHandle;
pub use picker::{DirectoryPicker, PathPicker, PickError, StaticPicker};
