use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::{AsyncTryFrom, BestEffortPathExt};
use crate::reader::{ReadError, save_file_system_tree};
use crate::tree::FileSystemTree;
use crate::vfs::{VfsError, VirtualFs};

const COMPRESSION_LEVEL: i32 = 3;

/// Saved structural shape of a container, for seeding it again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tree: FileSystemTree,
}

impl Snapshot {
    pub fn new(tree: FileSystemTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &FileSystemTree {
        &self.tree
    }

    /// Captures the whole filesystem, leaving out `node_modules`.
    pub async fn capture<V: VirtualFs>(fs: &V) -> Result<Self, SnapshotError> {
        let tree = save_file_system_tree(fs).await.context(CaptureSnafu)?;
        debug!("Captured snapshot with {} files", tree.file_count());
        Ok(Self { tree })
    }

    pub async fn restore<V: VirtualFs>(&self, fs: &V) -> Result<(), SnapshotError> {
        fs.mount(&self.tree).await.context(RestoreSnafu)?;
        info!("Restored snapshot with {} files", self.tree.file_count());
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let encoded = bincode::encode_to_vec(&self.tree, bincode::config::standard())
            .context(EncodeSnafu)?;
        zstd::encode_all(encoded.as_slice(), COMPRESSION_LEVEL).context(CompressSnafu)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let encoded = zstd::decode_all(bytes).context(CompressSnafu)?;
        let (tree, _) = bincode::decode_from_slice(&encoded, bincode::config::standard())
            .context(DecodeSnafu)?;
        Ok(Self { tree })
    }

    pub async fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.encode()?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(IoSnafu {
                path: parent.to_path_buf(),
            })?;
        }
        debug!(
            "Writing {} byte snapshot to {}",
            bytes.len(),
            path.best_effort_path_display()
        );
        fs::write(path, bytes).await.0.context(IoSnafu {
            path: path.to_path_buf(),
        })
    }

    pub async fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path).await.context(IoSnafu {
            path: path.to_path_buf(),
        })?;
        Self::decode(&bytes)
    }
}

impl AsyncTryFrom<&Path> for Snapshot {
    type Error = SnapshotError;

    async fn async_try_from(path: &Path) -> Result<Self, Self::Error> {
        Self::read(path).await
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to capture the container tree"))]
    CaptureError { source: ReadError },
    #[snafu(display("Failed to restore the snapshot into the container"))]
    RestoreError { source: VfsError },
    #[snafu(display("Failed to encode snapshot"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("Failed to decode snapshot"))]
    DecodeError { source: bincode::error::DecodeError },
    #[snafu(display("Failed to (de)compress snapshot"))]
    CompressError { source: std::io::Error },
    #[snafu(display("Snapshot I/O failed for {}", path.best_effort_path_display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}
