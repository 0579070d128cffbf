//! In-memory tree representation shared by every component.
//!
//! A tree is built once per traversal (from a handle source or a virtual
//! filesystem) and is only read afterwards. Besides the plain [`Node`] tree
//! there are two derived shapes: the id-bearing [`DisplayNode`] used for
//! incremental UI expansion and the name-keyed [`FileSystemTree`] accepted
//! by virtual filesystems as a bulk-import payload.

mod context;
mod display;
mod exclusions;
mod node;
pub mod path;
mod structural;

pub use context::CurrentDirectory;
pub use display::{DisplayNode, KeyGenerator, SequentialKeys, UuidKeys};
pub use exclusions::{Exclusions, GIT_DIR, NODE_MODULES};
pub use node::{DirectoryNode, FileNode, Node, NodeKind};
pub use structural::{FileSystemEntry, FileSystemTree};
