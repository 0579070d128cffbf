use std::sync::Arc;

use tracing::debug;

use super::Node;

/// The most recently picked directory tree.
///
/// Holds at most one tree. Every `set` and `clear` starts a new generation,
/// so a caller that remembered [`CurrentDirectory::generation`] can tell
/// whether the tree it saw is still the current one.
#[derive(Debug, Default)]
pub struct CurrentDirectory {
    tree: Option<Arc<Node>>,
    generation: u64,
}

impl CurrentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current tree and returns a shared handle to it.
    pub fn set(&mut self, tree: Node) -> Arc<Node> {
        let tree = Arc::new(tree);
        self.tree = Some(tree.clone());
        self.generation += 1;
        debug!(
            "Current directory set to '{}' (generation {})",
            tree.path(),
            self.generation
        );
        tree
    }

    pub fn get(&self) -> Option<&Arc<Node>> {
        self.tree.as_ref()
    }

    pub fn clear(&mut self) {
        if self.tree.take().is_some() {
            debug!("Current directory cleared");
        }
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.tree.is_some() && self.generation == generation
    }
}
