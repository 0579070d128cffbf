use std::collections::VecDeque;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, error};

use crate::tree::{DirectoryNode, FileNode, Node};

use super::{ArchiveCodec, ArchiveOutput, BlobStore, Compression, GenerateOptions, OutputType, ZipCodec};

/// A file to add to an archive. Without content it becomes an empty entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry<'a> {
    pub path: &'a str,
    pub content: Option<&'a str>,
}

impl<'a> FileEntry<'a> {
    pub fn empty(path: &'a str) -> Self {
        Self {
            path,
            content: None,
        }
    }
}

impl<'a> From<&'a FileNode> for FileEntry<'a> {
    fn from(file: &'a FileNode) -> Self {
        Self {
            path: &file.path,
            content: Some(&file.content),
        }
    }
}

/// Collects files and folders and turns them into archive bytes.
///
/// Every node is stored under its own `path`; nothing is re-derived from
/// the traversal.
#[derive(Debug, Default)]
pub struct Archiver<C = ZipCodec> {
    codec: C,
}

impl Archiver<ZipCodec> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ArchiveCodec> Archiver<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn add_file<'e>(&mut self, file: impl Into<FileEntry<'e>>) -> &mut Self {
        let file = file.into();
        self.codec.add_file(file.path, file.content.unwrap_or_default());
        self
    }

    pub fn add_folder(&mut self, path: &str) -> &mut Self {
        self.codec.add_folder(path);
        self
    }

    /// Adds `directory` and everything below it, breadth first.
    pub fn add_directory(&mut self, directory: &DirectoryNode) -> &mut Self {
        self.add_folder(&directory.path);
        let mut queue = directory.children.iter().collect::<VecDeque<_>>();
        while let Some(node) = queue.pop_front() {
            match node {
                Node::File(file) => {
                    self.add_file(file);
                }
                Node::Directory(directory) => {
                    self.add_folder(&directory.path);
                    queue.extend(directory.children.iter());
                }
            }
        }
        self
    }

    pub fn add_node(&mut self, node: &Node) -> &mut Self {
        match node {
            Node::File(file) => self.add_file(file),
            Node::Directory(directory) => self.add_directory(directory),
        }
    }

    /// Encodes the archive. A codec failure is logged and yields `None`,
    /// which callers must not confuse with an empty archive.
    pub fn generate(&self, options: &GenerateOptions) -> Option<ArchiveOutput> {
        match self.codec.generate(options.compression) {
            Ok(bytes) => {
                debug!(
                    "Generated {} byte archive ({} compression)",
                    bytes.len(),
                    options.compression
                );
                Some(match options.output {
                    OutputType::Bytes => ArchiveOutput::Bytes(bytes),
                    OutputType::Base64 => ArchiveOutput::Base64(STANDARD.encode(bytes)),
                })
            }
            Err(error) => {
                error!("Archive generation failed: {}", error);
                None
            }
        }
    }

    /// Generates the archive and registers it with `store`. Returns the
    /// reference URL, or an empty string when generation failed.
    pub fn download_zip(&self, store: &impl BlobStore) -> String {
        let options = GenerateOptions {
            output: OutputType::Bytes,
            compression: Compression::default(),
        };
        match self.generate(&options) {
            Some(ArchiveOutput::Bytes(bytes)) => store.create_object_url(bytes),
            Some(ArchiveOutput::Base64(_)) | None => String::new(),
        }
    }
}
