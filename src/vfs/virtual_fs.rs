use derive_more::Display;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::Snafu;

use crate::tree::{FileSystemEntry, FileSystemTree, path};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Create missing ancestors and accept an existing directory.
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RmOptions {
    /// A missing path is not an error.
    pub force: bool,
    /// Remove non-empty directories with everything inside.
    pub recursive: bool,
}

impl MkdirOptions {
    pub const RECURSIVE: Self = Self { recursive: true };
}

impl RmOptions {
    pub const FORCE_RECURSIVE: Self = Self {
        force: true,
        recursive: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
    #[display("other")]
    Other,
}

/// One result of [`VirtualFs::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A POSIX-like filesystem addressed by absolute `/`-separated paths.
///
/// Content is UTF-8 text.
pub trait VirtualFs {
    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<(), VfsError>;

    /// Creates or overwrites a file. The parent directory must exist.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), VfsError>;

    async fn read_file(&self, path: &str) -> Result<String, VfsError>;

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError>;

    async fn rm(&self, path: &str, options: RmOptions) -> Result<(), VfsError>;

    /// Seeds the filesystem root with a whole tree at once.
    async fn mount(&self, tree: &FileSystemTree) -> Result<(), VfsError> {
        mount_tree(self, path::ROOT, tree).await
    }
}

fn mount_tree<'a, V: VirtualFs + ?Sized>(
    fs: &'a V,
    base: &'a str,
    tree: &'a FileSystemTree,
) -> LocalBoxFuture<'a, Result<(), VfsError>> {
    async move {
        for (name, entry) in tree.iter() {
            let target = path::join(base, name);
            match entry {
                FileSystemEntry::File { contents } => fs.write_file(&target, contents).await?,
                FileSystemEntry::Directory { directory } => {
                    fs.mkdir(&target, MkdirOptions::RECURSIVE).await?;
                    mount_tree(fs, &target, directory).await?;
                }
            }
        }
        Ok(())
    }
    .boxed_local()
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VfsError {
    #[snafu(display("No such file or directory: '{}'", path))]
    NotFoundError { path: String },
    #[snafu(display("Not a directory: '{}'", path))]
    NotADirectoryError { path: String },
    #[snafu(display("Is a directory: '{}'", path))]
    IsADirectoryError { path: String },
    #[snafu(display("Already exists: '{}'", path))]
    AlreadyExistsError { path: String },
    #[snafu(display("Directory not empty: '{}'", path))]
    DirectoryNotEmptyError { path: String },
    #[snafu(display("Path '{}' escapes the filesystem root", path))]
    EscapesRootError { path: String },
    #[snafu(display("I/O failure on '{}'", path))]
    IoError {
        path: String,
        source: std::io::Error,
    },
}

impl VfsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFoundError { .. })
    }
}
