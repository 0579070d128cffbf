use uuid::Uuid;

use super::Node;

/// Source of unique keys for [`DisplayNode`]s.
pub trait KeyGenerator {
    fn next_key(&mut self) -> String;
}

/// Random v4 UUID keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn next_key(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `0`, `1`, `2`, ... keys.
#[derive(Debug, Default, Clone)]
pub struct SequentialKeys {
    next: u64,
}

impl KeyGenerator for SequentialKeys {
    fn next_key(&mut self) -> String {
        let key = self.next.to_string();
        self.next += 1;
        key
    }
}

/// Tree node shaped for a lazily expanded tree view.
///
/// Files are leaves and leave `children` unset; directories always carry a
/// (possibly empty) list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub key: String,
    pub title: String,
    pub is_leaf: bool,
    pub children: Option<Vec<DisplayNode>>,
}

impl DisplayNode {
    pub fn from_node(node: &Node, keys: &mut impl KeyGenerator) -> Self {
        let key = keys.next_key();
        match node {
            Node::File(file) => Self {
                key,
                title: file.name.clone(),
                is_leaf: true,
                children: None,
            },
            Node::Directory(directory) => Self {
                key,
                title: directory.name.clone(),
                is_leaf: false,
                children: Some(Self::from_children(&directory.children, keys)),
            },
        }
    }

    pub fn from_children(children: &[Node], keys: &mut impl KeyGenerator) -> Vec<Self> {
        children
            .iter()
            .map(|child| Self::from_node(child, keys))
            .collect()
    }
}
