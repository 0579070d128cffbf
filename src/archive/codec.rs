use std::str::FromStr;

use derive_more::Display;
use snafu::Snafu;

/// In-memory archive builder. Entries are only encoded by `generate`.
pub trait ArchiveCodec {
    /// Adds a file, replacing any earlier file at the same path.
    fn add_file(&mut self, path: &str, content: &str);

    /// Adds an explicit folder entry.
    fn add_folder(&mut self, path: &str);

    fn generate(&self, compression: Compression) -> Result<Vec<u8>, ArchiveError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum Compression {
    #[display("store")]
    Stored,
    #[default]
    #[display("deflate")]
    Deflated,
    #[display("zstd")]
    Zstd,
}

impl FromStr for Compression {
    type Err = ArchiveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "store" | "stored" => Ok(Compression::Stored),
            "deflate" | "deflated" => Ok(Compression::Deflated),
            "zstd" => Ok(Compression::Zstd),
            _ => UnknownCompressionSnafu { name: value }.fail(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputType {
    #[default]
    Bytes,
    Base64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub output: OutputType,
    pub compression: Compression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutput {
    Bytes(Vec<u8>),
    Base64(String),
}

impl ArchiveOutput {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ArchiveOutput::Bytes(bytes) => bytes,
            ArchiveOutput::Base64(text) => text.as_bytes(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArchiveError {
    #[snafu(display("Failed to encode zip entry '{}'", name))]
    ZipEntryError {
        name: String,
        source: zip::result::ZipError,
    },
    #[snafu(display("Failed to write content of zip entry '{}'", name))]
    ZipWriteError {
        name: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to finish zip archive"))]
    ZipFinishError { source: zip::result::ZipError },
    #[snafu(display("Archive codec failed: {}", message))]
    CodecError { message: String },
    #[snafu(display("Unknown compression '{}'", name))]
    UnknownCompressionError { name: String },
}
