use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::tree::{
    DirectoryNode, DisplayNode, FileNode, FileSystemTree, KeyGenerator, NODE_MODULES, Node, path,
};
use crate::vfs::{VfsError, VirtualFs};

/// Root name used when reading from the filesystem root.
pub const DEFAULT_PROJECT_NAME: &str = "project";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Leave `node_modules` directories out of the result.
    pub skip_node_modules: bool,
    /// Name of the root node when the starting path has no segments.
    pub root_name: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_node_modules: false,
            root_name: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

/// Reads a virtual filesystem back into a tree.
///
/// Every output shape comes from the same walk. A failure anywhere aborts
/// the whole read; no partial trees are returned.
#[derive(Debug)]
pub struct TreeReader<'a, V> {
    fs: &'a V,
    options: ReadOptions,
}

impl<'a, V: VirtualFs> TreeReader<'a, V> {
    pub fn new(fs: &'a V) -> Self {
        Self {
            fs,
            options: ReadOptions::default(),
        }
    }

    /// A reader for producing archives, which never bundle `node_modules`.
    pub fn for_archive(fs: &'a V) -> Self {
        Self::new(fs).with_options(ReadOptions {
            skip_node_modules: true,
            ..ReadOptions::default()
        })
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.options.root_name = root_name.into();
        self
    }

    pub async fn read_tree(&self, path: &str) -> Result<DirectoryNode, ReadError> {
        debug!("Reading tree from '{}'", path);
        self.walk(path, true).await
    }

    pub async fn read_file_node(&self, path: &str) -> Result<FileNode, ReadError> {
        let content = self
            .fs
            .read_file(path)
            .await
            .context(FileReadSnafu { path })?;
        Ok(FileNode::new(
            path::last_segment(path).unwrap_or_default(),
            path,
            content,
        ))
    }

    /// Lists `path` for a tree view. File contents are not read.
    pub async fn read_display_tree(
        &self,
        path: &str,
        keys: &mut impl KeyGenerator,
    ) -> Result<Vec<DisplayNode>, ReadError> {
        let tree = self.walk(path, false).await?;
        Ok(DisplayNode::from_children(&tree.children, keys))
    }

    /// Reads `path` into the name-keyed bulk-import shape.
    pub async fn read_structural_tree(&self, path: &str) -> Result<FileSystemTree, ReadError> {
        let tree = self.walk(path, true).await?;
        Ok(FileSystemTree::from_children(&tree.children))
    }

    fn walk<'b>(
        &'b self,
        path: &'b str,
        read_contents: bool,
    ) -> LocalBoxFuture<'b, Result<DirectoryNode, ReadError>> {
        async move {
            let path = match path.trim_end_matches(path::SEPARATOR) {
                "" => path::ROOT,
                trimmed => trimmed,
            };
            let entries = self.fs.read_dir(path).await.context(ListSnafu { path })?;
            let mut children = Vec::with_capacity(entries.len());

            for entry in entries {
                let child_path = path::join(path, &entry.name);
                if entry.is_file() {
                    let content = if read_contents {
                        self.fs
                            .read_file(&child_path)
                            .await
                            .context(FileReadSnafu { path: &child_path })?
                    } else {
                        String::new()
                    };
                    children.push(Node::from(FileNode::new(entry.name, child_path, content)));
                } else if entry.is_directory() {
                    if self.options.skip_node_modules && entry.name == NODE_MODULES {
                        debug!("Skipping '{}'", child_path);
                        continue;
                    }
                    children.push(self.walk(&child_path, read_contents).await?.into());
                } else {
                    trace!("Ignoring '{}' ({})", child_path, entry.kind);
                }
            }

            let name = path::last_segment(path).unwrap_or(&self.options.root_name);
            Ok(DirectoryNode::new(name, path, children))
        }
        .boxed_local()
    }
}

/// Structural shape of the whole filesystem, as exported for archives and
/// snapshots.
pub async fn save_file_system_tree<V: VirtualFs>(fs: &V) -> Result<FileSystemTree, ReadError> {
    TreeReader::for_archive(fs)
        .read_structural_tree(path::ROOT)
        .await
}

#[derive(Debug, Snafu)]
pub enum ReadError {
    #[snafu(display("Failed to list directory '{}'", path))]
    ListError { path: String, source: VfsError },
    #[snafu(display("Failed to read file '{}'", path))]
    FileReadError { path: String, source: VfsError },
}
