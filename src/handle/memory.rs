use futures::{Stream, stream};

use super::{FileSystemHandle, HandleError, HandleKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryEntry {
    File(Option<String>),
    Directory(Vec<MemoryHandle>),
}

/// Handle into a tree that already lives in memory.
///
/// A handle can be marked revoked to stand in for a source that went away
/// after it was handed out; every access to it then fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHandle {
    name: String,
    entry: MemoryEntry,
    revoked: bool,
}

impl MemoryHandle {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: MemoryEntry::File(Some(content.into())),
            revoked: false,
        }
    }

    /// A file whose read yields no content at all.
    pub fn unreadable_file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: MemoryEntry::File(None),
            revoked: false,
        }
    }

    pub fn directory(name: impl Into<String>, children: Vec<MemoryHandle>) -> Self {
        Self {
            name: name.into(),
            entry: MemoryEntry::Directory(children),
            revoked: false,
        }
    }

    pub fn revoked(mut self) -> Self {
        self.revoked = true;
        self
    }

    fn check_access(&self) -> Result<(), HandleError> {
        if self.revoked {
            return Err(HandleError::RevokedError {
                handle: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl FileSystemHandle for MemoryHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandleKind {
        match self.entry {
            MemoryEntry::File(_) => HandleKind::File,
            MemoryEntry::Directory(_) => HandleKind::Directory,
        }
    }

    fn entries(&self) -> impl Stream<Item = Result<Self, HandleError>> + '_ {
        let children: Vec<Result<Self, HandleError>> = match (&self.entry, self.check_access()) {
            (_, Err(error)) => vec![Err(error)],
            (MemoryEntry::Directory(children), Ok(())) => children.iter().cloned().map(Ok).collect(),
            (MemoryEntry::File(_), Ok(())) => Vec::new(),
        };
        stream::iter(children)
    }

    async fn read_text(&self) -> Result<Option<String>, HandleError> {
        self.check_access()?;
        match &self.entry {
            MemoryEntry::File(content) => Ok(content.clone()),
            MemoryEntry::Directory(_) => Ok(None),
        }
    }
}
