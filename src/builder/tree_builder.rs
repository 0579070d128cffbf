use std::pin::pin;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, trace};

use crate::handle::{DirectoryPicker, FileSystemHandle, HandleError, HandleKind};
use crate::tree::{CurrentDirectory, DirectoryNode, Exclusions, FileNode, Node};

/// Walks a handle source and materializes it as a [`Node`] tree.
///
/// Siblings are visited one at a time in enumeration order. Excluded
/// directories are skipped before anything inside them is touched.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    exclusions: Exclusions,
}

impl TreeBuilder {
    pub fn new(exclusions: Exclusions) -> Self {
        Self { exclusions }
    }

    /// Asks `picker` for a root directory and builds it.
    ///
    /// A declined pick is `Ok(None)` and leaves `current` untouched. On
    /// success the tree becomes the current directory.
    pub async fn get_directory<P: DirectoryPicker>(
        &self,
        picker: &P,
        current: &mut CurrentDirectory,
    ) -> Result<Option<Arc<Node>>, BuildError> {
        let handle = match picker.pick().await {
            Ok(handle) => handle,
            Err(error) => {
                info!("No directory picked: {}", error);
                return Ok(None);
            }
        };

        debug!("Building tree for picked directory '{}'", handle.name());
        let tree = self.build(&handle, "").await?;
        Ok(Some(current.set(tree)))
    }

    /// Builds the subtree under `handle`, whose path becomes
    /// `{path}/{handle name}`.
    pub fn build<'a, H: FileSystemHandle>(
        &'a self,
        handle: &'a H,
        path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Node, BuildError>> {
        async move {
            let path = format!("{path}/{}", handle.name());
            match handle.kind() {
                HandleKind::File => {
                    let content = handle
                        .read_text()
                        .await
                        .context(TraversalSnafu { path: path.clone() })?
                        .unwrap_or_default();
                    trace!("Read {} bytes from '{}'", content.len(), path);
                    Ok(FileNode::new(handle.name(), path, content).into())
                }
                HandleKind::Directory => {
                    let mut children = Vec::new();
                    let mut entries = pin!(handle.entries());
                    while let Some(child) = entries.next().await {
                        let child = child.context(TraversalSnafu { path: path.clone() })?;
                        if child.kind() == HandleKind::Directory
                            && self.exclusions.is_excluded(child.name())
                        {
                            debug!("Skipping excluded directory '{}/{}'", path, child.name());
                            continue;
                        }
                        children.push(self.build(&child, &path).await?);
                    }
                    Ok(DirectoryNode::new(handle.name(), path, children).into())
                }
            }
        }
        .boxed_local()
    }
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Failed to traverse '{}'", path))]
    TraversalError { path: String, source: HandleError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{MemoryHandle, PathPicker, StaticPicker};
    use crate::tree::path;
    use tempfile::TempDir;

    fn assert_paths_are_consistent(node: &Node) {
        if let Node::Directory(directory) = node {
            for child in &directory.children {
                assert_eq!(child.path(), format!("{}/{}", directory.path, child.name()));
                assert_paths_are_consistent(child);
            }
        }
    }

    #[compio::test]
    async fn excluded_directories_are_absent() {
        let source = MemoryHandle::directory(
            "proj",
            vec![
                MemoryHandle::file("a.txt", "hello"),
                MemoryHandle::directory(
                    "node_modules",
                    vec![MemoryHandle::file("x.js", "module.exports = 1")],
                ),
            ],
        );

        let tree = TreeBuilder::default().build(&source, "").await.unwrap();

        assert_eq!(
            tree,
            Node::from(DirectoryNode::new(
                "proj",
                "/proj",
                vec![FileNode::new("a.txt", "/proj/a.txt", "hello").into()],
            ))
        );
    }

    #[compio::test]
    async fn nested_paths_extend_the_parent_path() {
        let source = MemoryHandle::directory(
            "proj",
            vec![
                MemoryHandle::directory(
                    "src",
                    vec![
                        MemoryHandle::file("lib.rs", "pub mod a;"),
                        MemoryHandle::directory(".git", vec![MemoryHandle::file("HEAD", "ref")]),
                        MemoryHandle::directory(
                            "deep",
                            vec![MemoryHandle::directory(
                                "node_modules",
                                vec![MemoryHandle::file("y.js", "")],
                            )],
                        ),
                    ],
                ),
                MemoryHandle::directory("empty", Vec::new()),
            ],
        );

        let tree = TreeBuilder::default().build(&source, "").await.unwrap();

        assert_paths_are_consistent(&tree);
        let paths = tree.descendants().map(Node::path).collect::<Vec<_>>();
        assert_eq!(
            paths,
            vec![
                "/proj",
                "/proj/src",
                "/proj/src/lib.rs",
                "/proj/src/deep",
                "/proj/empty"
            ]
        );
        for node in tree.descendants() {
            assert!(
                path::segments(node.path()).all(|segment| segment != "node_modules" && segment != ".git")
            );
        }
    }

    #[compio::test]
    async fn files_named_like_excluded_directories_are_kept() {
        let source = MemoryHandle::directory(
            "proj",
            vec![MemoryHandle::file(".git", "gitdir: ../.git/worktrees/proj")],
        );

        let tree = TreeBuilder::default().build(&source, "").await.unwrap();

        assert!(tree.as_directory().unwrap().child(".git").is_some());
    }

    #[compio::test]
    async fn extra_exclusions_apply_at_any_depth() {
        let source = MemoryHandle::directory(
            "proj",
            vec![MemoryHandle::directory(
                "pkg",
                vec![MemoryHandle::directory("dist", vec![MemoryHandle::file("out.js", "")])],
            )],
        );

        let tree = TreeBuilder::new(Exclusions::with_extra(["dist"]))
            .build(&source, "")
            .await
            .unwrap();

        let paths = tree.descendants().map(Node::path).collect::<Vec<_>>();
        assert_eq!(paths, vec!["/proj", "/proj/pkg"]);
    }

    #[compio::test]
    async fn unreadable_files_become_empty() {
        let source = MemoryHandle::directory("proj", vec![MemoryHandle::unreadable_file("a.txt")]);

        let tree = TreeBuilder::default().build(&source, "").await.unwrap();

        let file = tree.as_directory().unwrap().child("a.txt").unwrap();
        assert_eq!(file.as_file().unwrap().content, "");
    }

    #[compio::test]
    async fn revoked_handles_abort_the_whole_build() {
        let source = MemoryHandle::directory(
            "proj",
            vec![
                MemoryHandle::file("a.txt", "a"),
                MemoryHandle::directory("src", vec![MemoryHandle::file("b.txt", "b").revoked()]),
            ],
        );

        let result = TreeBuilder::default().build(&source, "").await;

        match result {
            Err(BuildError::TraversalError { path, .. }) => assert_eq!(path, "/proj/src/b.txt"),
            other => panic!("Expected TraversalError, got {:?}", other),
        }
    }

    #[compio::test]
    async fn declined_pick_is_not_an_error() {
        let mut current = CurrentDirectory::new();
        current.set(DirectoryNode::new("old", "/old", Vec::new()).into());
        let generation = current.generation();

        let picked = TreeBuilder::default()
            .get_directory(&StaticPicker::<MemoryHandle>::declining(), &mut current)
            .await
            .unwrap();

        assert!(picked.is_none());
        assert!(current.is_current(generation));
        assert_eq!(current.get().unwrap().name(), "old");
    }

    #[compio::test]
    async fn successful_pick_becomes_current() {
        let mut current = CurrentDirectory::new();
        let picker = StaticPicker::new(MemoryHandle::directory(
            "proj",
            vec![MemoryHandle::file("a.txt", "hello")],
        ));

        let picked = TreeBuilder::default()
            .get_directory(&picker, &mut current)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(picked.path(), "/proj");
        assert!(std::sync::Arc::ptr_eq(current.get().unwrap(), &picked));
    }

    #[compio::test]
    async fn builds_local_directories() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let root = dir.path().join("proj");
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("a.txt"), "hello").unwrap();
        std::fs::write(root.join("node_modules/pkg/x.js"), "x").unwrap();
        std::fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();

        let mut current = CurrentDirectory::new();
        let tree = TreeBuilder::default()
            .get_directory(&PathPicker::new(&root), &mut current)
            .await
            .unwrap()
            .unwrap();

        let mut paths = tree
            .descendants()
            .map(|node| node.path().to_string())
            .collect::<Vec<_>>();
        paths.sort();
        assert_eq!(
            paths,
            vec!["/proj", "/proj/a.txt", "/proj/src", "/proj/src/main.rs"]
        );
    }
}
