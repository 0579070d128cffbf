use std::path::{Path, PathBuf};

use compio::fs;
use futures::{Stream, StreamExt, future, stream};
use snafu::ResultExt;
use tracing::trace;

use crate::ext::{AsyncTryFrom, BestEffortPathExt};

use super::handle::{EnumerateSnafu, ReadSnafu};
use super::{FileSystemHandle, HandleError, HandleKind};

/// Handle to a file or directory on the host filesystem.
///
/// Entry kinds follow symlinks, so a link to a directory is walked like the
/// directory itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHandle {
    name: String,
    path: PathBuf,
    kind: HandleKind,
}

impl LocalHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let kind = if metadata.is_dir() {
            HandleKind::Directory
        } else {
            HandleKind::File
        };
        Self { name, path, kind }
    }
}

impl AsyncTryFrom<&Path> for LocalHandle {
    type Error = HandleError;

    async fn async_try_from(path: &Path) -> Result<Self, Self::Error> {
        let metadata = path.metadata().context(EnumerateSnafu {
            handle: path.best_effort_path_display(),
        })?;
        Ok(Self::from_metadata(path.to_path_buf(), &metadata))
    }
}

impl FileSystemHandle for LocalHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> HandleKind {
        self.kind
    }

    fn entries(&self) -> impl Stream<Item = Result<Self, HandleError>> + '_ {
        let handle = self.path.best_effort_path_display();
        trace!("Enumerating {}", handle);
        match std::fs::read_dir(&self.path) {
            Ok(read_dir) => stream::iter(read_dir.map(move |entry| {
                let path = entry
                    .context(EnumerateSnafu {
                        handle: handle.clone(),
                    })?
                    .path();
                let metadata = path.metadata().context(EnumerateSnafu {
                    handle: path.best_effort_path_display(),
                })?;
                Ok(Self::from_metadata(path, &metadata))
            }))
            .left_stream(),
            Err(source) => {
                stream::once(future::ready(Err(HandleError::EnumerateError { handle, source })))
                    .right_stream()
            }
        }
    }

    async fn read_text(&self) -> Result<Option<String>, HandleError> {
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            handle: self.path.best_effort_path_display(),
        })?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
