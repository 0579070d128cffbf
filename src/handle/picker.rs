use std::path::PathBuf;

use snafu::Snafu;
use tracing::debug;

use crate::ext::{AsyncTryFrom, BestEffortPathExt};

use super::{FileSystemHandle, LocalHandle};

/// The interactive step that hands out a root directory handle.
pub trait DirectoryPicker {
    type Handle: FileSystemHandle;

    async fn pick(&self) -> Result<Self::Handle, PickError>;
}

#[derive(Debug, Snafu)]
pub enum PickError {
    #[snafu(display("Directory selection was declined"))]
    DeclinedError,
    #[snafu(display("Directory '{}' is not available", path))]
    UnavailableError { path: String },
}

/// Picks a fixed directory on the host filesystem.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: PathBuf,
}

impl PathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DirectoryPicker for PathPicker {
    type Handle = LocalHandle;

    async fn pick(&self) -> Result<Self::Handle, PickError> {
        let shown = self.path.best_effort_path_display();
        if !self.path.is_dir() {
            debug!("Refusing to pick '{}': not a directory", shown);
            return Err(PickError::UnavailableError { path: shown });
        }
        LocalHandle::async_try_from(self.path.as_path())
            .await
            .map_err(|_| PickError::UnavailableError { path: shown })
    }
}

/// Hands out a clone of a preset handle, or declines when there is none.
#[derive(Debug, Clone)]
pub struct StaticPicker<H> {
    handle: Option<H>,
}

impl<H> StaticPicker<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn declining() -> Self {
        Self { handle: None }
    }
}

impl<H: FileSystemHandle + Clone> DirectoryPicker for StaticPicker<H> {
    type Handle = H;

    async fn pick(&self) -> Result<Self::Handle, PickError> {
        self.handle.clone().ok_or(PickError::DeclinedError)
    }
}
