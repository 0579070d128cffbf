use bincode::de::Decoder;
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode, impl_borrow_decode};
use derive_more::{Deref, DerefMut, From, IntoIterator};
use hashlink::LinkedHashMap;

use super::Node;

/// Entry of a [`FileSystemTree`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum FileSystemEntry {
    File { contents: String },
    Directory { directory: FileSystemTree },
}

/// A directory's entries keyed by name, in the shape a virtual filesystem
/// accepts for bulk seeding.
///
/// Entries keep the order they were listed in; equality is order-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, From, IntoIterator)]
pub struct FileSystemTree(LinkedHashMap<String, FileSystemEntry>);

impl Encode for FileSystemTree {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        (self.len() as u64).encode(encoder)?;
        for (name, entry) in self.iter() {
            name.encode(encoder)?;
            entry.encode(encoder)?;
        }
        Ok(())
    }
}

impl<Context> Decode<Context> for FileSystemTree {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let len = u64::decode(decoder)?;
        let mut tree = Self::new();
        for _ in 0..len {
            let name = String::decode(decoder)?;
            let entry = FileSystemEntry::decode(decoder)?;
            tree.insert(name, entry);
        }
        Ok(tree)
    }
}

impl_borrow_decode!(FileSystemTree);

impl FileSystemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces a list of sibling nodes into a mapping keyed by name.
    pub fn from_children(children: &[Node]) -> Self {
        children.iter().fold(Self::new(), |mut tree, child| {
            let entry = match child {
                Node::File(file) => FileSystemEntry::File {
                    contents: file.content.clone(),
                },
                Node::Directory(directory) => FileSystemEntry::Directory {
                    directory: Self::from_children(&directory.children),
                },
            };
            tree.insert(child.name().to_string(), entry);
            tree
        })
    }

    pub fn file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(
            name.into(),
            FileSystemEntry::File {
                contents: contents.into(),
            },
        );
        self
    }

    pub fn directory(mut self, name: impl Into<String>, directory: FileSystemTree) -> Self {
        self.insert(name.into(), FileSystemEntry::Directory { directory });
        self
    }

    /// Number of files anywhere below this level.
    pub fn file_count(&self) -> usize {
        self.values()
            .map(|entry| match entry {
                FileSystemEntry::File { .. } => 1,
                FileSystemEntry::Directory { directory } => directory.file_count(),
            })
            .sum()
    }
}
