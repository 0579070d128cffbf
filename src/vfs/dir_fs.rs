use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use tracing::{debug, trace};

use crate::ext::BestEffortPathExt;
use crate::tree::path;

use super::{DirEntry, EntryKind, MkdirOptions, RmOptions, VfsError, VirtualFs};

/// Filesystem confined to a directory of the host.
///
/// `/` maps to the root directory; paths that would climb above it are
/// rejected.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens `root`, creating it when missing.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, VfsError> {
        let root = root.into();
        debug!("Opening container at {}", root.best_effort_path_display());
        fs::create_dir_all(&root)
            .await
            .map_err(|source| map_io(&root.best_effort_path_display(), source))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, VfsError> {
        let mut resolved = Vec::new();
        for segment in path::segments(path) {
            match segment {
                "." => {}
                ".." => {
                    if resolved.pop().is_none() {
                        return Err(VfsError::EscapesRootError {
                            path: path.to_string(),
                        });
                    }
                }
                name => resolved.push(name),
            }
        }
        Ok(resolved
            .into_iter()
            .fold(self.root.clone(), |target, segment| target.join(segment)))
    }
}

fn map_io(path: &str, source: std::io::Error) -> VfsError {
    let path = path.to_string();
    match source.kind() {
        ErrorKind::NotFound => VfsError::NotFoundError { path },
        ErrorKind::AlreadyExists => VfsError::AlreadyExistsError { path },
        ErrorKind::NotADirectory => VfsError::NotADirectoryError { path },
        ErrorKind::IsADirectory => VfsError::IsADirectoryError { path },
        ErrorKind::DirectoryNotEmpty => VfsError::DirectoryNotEmptyError { path },
        _ => VfsError::IoError { path, source },
    }
}

impl VirtualFs for DirFs {
    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<(), VfsError> {
        let target = self.resolve(path)?;
        trace!("mkdir {} ({:?})", target.display(), options);
        let result = if options.recursive {
            fs::create_dir_all(&target).await
        } else {
            fs::create_dir(&target).await
        };
        result.map_err(|source| map_io(path, source))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), VfsError> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            return Err(VfsError::IsADirectoryError {
                path: path.to_string(),
            });
        }
        trace!("write {} ({} bytes)", target.display(), content.len());
        fs::write(&target, content.as_bytes().to_vec())
            .await
            .0
            .map_err(|source| map_io(path, source))
    }

    async fn read_file(&self, path: &str) -> Result<String, VfsError> {
        let target = self.resolve(path)?;
        if target.is_dir() {
            return Err(VfsError::IsADirectoryError {
                path: path.to_string(),
            });
        }
        let bytes = fs::read(&target)
            .await
            .map_err(|source| map_io(path, source))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let target = self.resolve(path)?;
        let read_dir = std::fs::read_dir(&target).map_err(|source| map_io(path, source))?;
        read_dir
            .map(|entry| {
                let entry = entry.map_err(|source| map_io(path, source))?;
                let file_type = entry.file_type().map_err(|source| map_io(path, source))?;
                let kind = if file_type.is_file() {
                    EntryKind::File
                } else if file_type.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::Other
                };
                Ok(DirEntry::new(entry.file_name().to_string_lossy(), kind))
            })
            .collect()
    }

    async fn rm(&self, path: &str, options: RmOptions) -> Result<(), VfsError> {
        let target = self.resolve(path)?;
        trace!("rm {} ({:?})", target.display(), options);
        let metadata = match target.symlink_metadata() {
            Ok(metadata) => metadata,
            Err(source) if source.kind() == ErrorKind::NotFound && options.force => return Ok(()),
            Err(source) => return Err(map_io(path, source)),
        };

        let result = if !metadata.is_dir() {
            fs::remove_file(&target).await
        } else if target == self.root {
            clear_directory(&target, options.recursive)
        } else if options.recursive {
            std::fs::remove_dir_all(&target)
        } else {
            std::fs::remove_dir(&target)
        };
        result.map_err(|source| map_io(path, source))
    }
}

/// Empties the root directory without removing the directory itself.
fn clear_directory(root: &Path, recursive: bool) -> std::io::Result<()> {
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !recursive {
            return Err(std::io::Error::from(ErrorKind::DirectoryNotEmpty));
        }
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
