use derive_more::{Display, From};

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// A file with its full text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub content: String,
}

/// A directory with its children in source enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub children: Vec<Node>,
}

/// A single element of a tree.
///
/// `path` always equals the parent's path, a `/` and `name`. Whatever prefix
/// the root was given is shared by all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl FileNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }
}

impl DirectoryNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children,
        }
    }

    /// Finds a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name() == name)
    }
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Directory(directory) => &directory.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::File(file) => &file.path,
            Node::Directory(directory) => &directory.path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::File(_) => None,
            Node::Directory(directory) => Some(directory),
        }
    }

    /// Iterates over this node and all of its descendants, depth first,
    /// parents before children.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Node::Directory(directory) = node {
            self.stack.extend(directory.children.iter().rev());
        }
        Some(node)
    }
}
