//! Serializing trees into compressed archives.

mod archiver;
mod blob;
mod codec;
mod zip_codec;

pub use archiver::{Archiver, FileEntry};
pub use blob::{BlobStore, MemoryBlobStore};
pub use codec::{ArchiveCodec, ArchiveError, ArchiveOutput, Compression, GenerateOptions, OutputType};
pub use zip_codec::ZipCodec;
