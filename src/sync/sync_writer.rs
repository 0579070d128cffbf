use derive_more::{Add, AddAssign};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::tree::{Node, path};
use crate::vfs::{MkdirOptions, RmOptions, VfsError, VirtualFs};

/// What a full tree write touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign)]
pub struct SyncSummary {
    pub directories: usize,
    pub files: usize,
}

/// Materializes trees and single entries inside a virtual filesystem.
///
/// Writes are full and sequential. A failed write leaves whatever was
/// already written in place.
#[derive(Debug)]
pub struct SyncWriter<'a, V> {
    fs: &'a V,
}

impl<'a, V: VirtualFs> SyncWriter<'a, V> {
    pub fn new(fs: &'a V) -> Self {
        Self { fs }
    }

    /// Writes `node` and everything below it at the nodes' own paths.
    pub async fn write_tree(&self, node: &Node) -> Result<SyncSummary, SyncError> {
        let summary = self.write_node(node).await?;
        info!(
            "Synchronized '{}': {} directories, {} files",
            node.path(),
            summary.directories,
            summary.files
        );
        Ok(summary)
    }

    fn write_node<'b>(&'b self, node: &'b Node) -> LocalBoxFuture<'b, Result<SyncSummary, SyncError>> {
        async move {
            match node {
                Node::File(file) => {
                    self.write_file(&file.path, &file.content).await?;
                    Ok(SyncSummary {
                        directories: 0,
                        files: 1,
                    })
                }
                Node::Directory(directory) => {
                    self.create_dir(&directory.path).await?;
                    let mut summary = SyncSummary {
                        directories: 1,
                        files: 0,
                    };
                    for child in &directory.children {
                        summary += self.write_node(child).await?;
                    }
                    Ok(summary)
                }
            }
        }
        .boxed_local()
    }

    /// Creates a directory and any missing ancestors.
    pub async fn create_dir(&self, path: &str) -> Result<(), SyncError> {
        self.fs
            .mkdir(path, MkdirOptions::RECURSIVE)
            .await
            .context(CreateDirSnafu { path })
    }

    pub async fn create_file(&self, path: &str) -> Result<(), SyncError> {
        self.write_file(path, "").await
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), SyncError> {
        self.fs
            .write_file(path, content)
            .await
            .context(WriteSnafu { path })
    }

    /// Removes `path` and everything below it. A missing path is fine.
    pub async fn remove(&self, path: &str) -> Result<(), SyncError> {
        debug!("Removing '{}'", path);
        self.fs
            .rm(path, RmOptions::FORCE_RECURSIVE)
            .await
            .context(RemoveSnafu { path })
    }

    /// Renames the file at `path` within its directory and returns the new
    /// path. Directories are rejected.
    pub async fn rename(&self, path: &str, new_name: &str) -> Result<String, SyncError> {
        ensure!(
            !new_name.is_empty()
                && new_name != "."
                && new_name != ".."
                && !new_name.contains(path::SEPARATOR),
            InvalidNameSnafu { name: new_name }
        );
        let Some(old_name) = path::last_segment(path) else {
            return RenameDirectorySnafu { path }.fail();
        };

        let parent = path::parent(path);
        let entries = self
            .fs
            .read_dir(&parent)
            .await
            .context(RenameReadSnafu { path })?;
        match entries.iter().find(|entry| entry.name == old_name) {
            None => {
                return Err(VfsError::NotFoundError {
                    path: path.to_string(),
                })
                .context(RenameReadSnafu { path });
            }
            Some(entry) if entry.is_directory() => return RenameDirectorySnafu { path }.fail(),
            Some(_) => {}
        }

        let new_path = path::replace_last_segment(path, new_name);
        ensure!(
            !entries
                .iter()
                .any(|entry| entry.name == new_name && entry.is_directory()),
            TargetIsDirectorySnafu { path: &new_path }
        );

        let content = self
            .fs
            .read_file(path)
            .await
            .context(RenameReadSnafu { path })?;
        self.remove(path).await?;
        self.write_file(&new_path, &content).await?;
        debug!("Renamed '{}' to '{}'", path, new_path);
        Ok(new_path)
    }
}

#[derive(Debug, Snafu)]
pub enum SyncError {
    #[snafu(display("Failed to create directory '{}'", path))]
    CreateDirError { path: String, source: VfsError },
    #[snafu(display("Failed to write file '{}'", path))]
    WriteError { path: String, source: VfsError },
    #[snafu(display("Failed to remove '{}'", path))]
    RemoveError { path: String, source: VfsError },
    #[snafu(display("Failed to read '{}' for renaming", path))]
    RenameReadError { path: String, source: VfsError },
    #[snafu(display("Cannot rename directory '{}'", path))]
    RenameDirectoryError { path: String },
    #[snafu(display("Cannot rename onto directory '{}'", path))]
    TargetIsDirectoryError { path: String },
    #[snafu(display("'{}' is not a valid entry name", name))]
    InvalidNameError { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use crate::handle::MemoryHandle;
    use crate::reader::TreeReader;
    use crate::tree::{DirectoryNode, FileNode};
    use crate::vfs::{DirFs, MemoryFs};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn sample_tree() -> Node {
        DirectoryNode::new(
            "proj",
            "/proj",
            vec![
                FileNode::new("a.txt", "/proj/a.txt", "hello").into(),
                DirectoryNode::new(
                    "src",
                    "/proj/src",
                    vec![
                        FileNode::new("main.rs", "/proj/src/main.rs", "fn main() {}").into(),
                        FileNode::new("empty.rs", "/proj/src/empty.rs", "").into(),
                    ],
                )
                .into(),
                DirectoryNode::new("assets", "/proj/assets", Vec::new()).into(),
            ],
        )
        .into()
    }

    fn files_by_path(node: &Node) -> BTreeMap<String, Option<String>> {
        node.descendants()
            .map(|node| {
                (
                    node.path().to_string(),
                    node.as_file().map(|file| file.content.clone()),
                )
            })
            .collect()
    }

    #[compio::test]
    async fn written_trees_read_back_identically() {
        let fs = MemoryFs::new();
        let tree = sample_tree();

        let summary = SyncWriter::new(&fs).write_tree(&tree).await.unwrap();
        assert_eq!(
            summary,
            SyncSummary {
                directories: 3,
                files: 3
            }
        );

        let read_back = Node::from(TreeReader::new(&fs).read_tree("/proj").await.unwrap());
        assert_eq!(read_back, tree);
    }

    #[compio::test]
    async fn repeated_writes_are_idempotent() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let fs = DirFs::create(dir.path()).await.unwrap();
        let tree = sample_tree();
        let writer = SyncWriter::new(&fs);

        writer.write_tree(&tree).await.unwrap();
        let first = std::fs::read_to_string(dir.path().join("proj/src/main.rs")).unwrap();
        writer.write_tree(&tree).await.unwrap();
        let second = std::fs::read_to_string(dir.path().join("proj/src/main.rs")).unwrap();
        assert_eq!(first, second);

        let read_back = Node::from(TreeReader::new(&fs).read_tree("/proj").await.unwrap());
        assert_eq!(files_by_path(&read_back), files_by_path(&tree));
    }

    #[compio::test]
    async fn built_trees_round_trip_through_the_container() {
        let source = MemoryHandle::directory(
            "proj",
            vec![
                MemoryHandle::file("a.txt", "hello"),
                MemoryHandle::directory("node_modules", vec![MemoryHandle::file("x.js", "x")]),
                MemoryHandle::directory("lib", vec![MemoryHandle::file("b.txt", "b")]),
            ],
        );
        let tree = TreeBuilder::default().build(&source, "").await.unwrap();
        let fs = MemoryFs::new();

        SyncWriter::new(&fs).write_tree(&tree).await.unwrap();

        let read_back = Node::from(TreeReader::new(&fs).read_tree("/proj").await.unwrap());
        assert_eq!(files_by_path(&read_back), files_by_path(&tree));
    }

    #[compio::test]
    async fn rename_moves_content_to_a_sibling() {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);
        writer.create_dir("/a/b").await.unwrap();
        writer.write_file("/a/b/c.txt", "content").await.unwrap();

        let new_path = writer.rename("/a/b/c.txt", "d.txt").await.unwrap();

        assert_eq!(new_path, "/a/b/d.txt");
        assert_eq!(fs.read_file("/a/b/d.txt").await.unwrap(), "content");
        assert!(fs.read_file("/a/b/c.txt").await.unwrap_err().is_not_found());
    }

    #[compio::test]
    async fn rename_rejects_directories_and_missing_paths() {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);
        writer.create_dir("/a/b").await.unwrap();

        assert!(matches!(
            writer.rename("/a/b", "c").await,
            Err(SyncError::RenameDirectoryError { .. })
        ));
        assert!(fs.read_dir("/a/b").await.is_ok());
        assert!(matches!(
            writer.rename("/a/missing.txt", "c.txt").await,
            Err(SyncError::RenameReadError { .. })
        ));
    }

    #[compio::test]
    async fn rename_onto_a_directory_keeps_the_source() {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);
        writer.create_dir("/a/d.txt").await.unwrap();
        writer.write_file("/a/c.txt", "precious").await.unwrap();

        let result = writer.rename("/a/c.txt", "d.txt").await;

        match result {
            Err(SyncError::TargetIsDirectoryError { path }) => assert_eq!(path, "/a/d.txt"),
            other => panic!("Unexpected result: {other:?}"),
        }
        assert_eq!(fs.read_file("/a/c.txt").await.unwrap(), "precious");
        assert!(fs.read_dir("/a/d.txt").await.is_ok());
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("..")]
    #[case("x/y.txt")]
    #[compio::test]
    async fn rename_rejects_invalid_names(#[case] name: &str) {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);
        writer.write_file("/c.txt", "c").await.unwrap();

        let result = writer.rename("/c.txt", name).await;

        assert!(matches!(result, Err(SyncError::InvalidNameError { .. })));
        assert_eq!(fs.read_file("/c.txt").await.unwrap(), "c");
    }

    #[compio::test]
    async fn single_entry_operations() {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);

        writer.create_file("/new.txt").await.unwrap();
        assert_eq!(fs.read_file("/new.txt").await.unwrap(), "");

        writer.write_file("/new.txt", "filled").await.unwrap();
        assert_eq!(fs.read_file("/new.txt").await.unwrap(), "filled");

        writer.remove("/new.txt").await.unwrap();
        writer.remove("/new.txt").await.unwrap();
        assert!(fs.read_dir("/").await.unwrap().is_empty());
    }

    #[compio::test]
    async fn failures_surface_with_the_offending_path() {
        let fs = MemoryFs::new();
        let writer = SyncWriter::new(&fs);
        writer.write_file("/proj", "not a directory").await.unwrap();

        let result = writer.write_tree(&sample_tree()).await;

        match result {
            Err(SyncError::CreateDirError { path, .. }) => assert_eq!(path, "/proj"),
            other => panic!("Expected CreateDirError, got {:?}", other),
        }
    }
}
