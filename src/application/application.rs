use std::path::{Path, PathBuf};

use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{RuntimeConfig, render_display_tree};
use crate::archive::{Archiver, GenerateOptions, OutputType};
use crate::builder::{BuildError, TreeBuilder};
use crate::cli::Command;
use crate::config::{ConfigError, SyncConfig};
use crate::ext::BestEffortPathExt;
use crate::handle::PathPicker;
use crate::reader::{ReadError, TreeReader};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::sync::{SyncError, SyncWriter};
use crate::tree::{CurrentDirectory, Node, SequentialKeys};
use crate::vfs::{DirFs, VfsError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let config = SyncConfig::read(&app_config.root)
            .await
            .context(LoadConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        match app_config.command {
            Command::Sync { source, container } => {
                let tree = Self::build_tree(&config, &source).await?;
                let fs = Self::create_container(&container).await?;
                let summary = SyncWriter::new(&fs)
                    .write_tree(&tree)
                    .await
                    .context(WriteContainerSnafu)?;
                println!(
                    "Synced {} directories and {} files into {}",
                    summary.directories,
                    summary.files,
                    container.best_effort_path_display()
                );
            }
            Command::Pack { source, output } => {
                let tree = Self::build_tree(&config, &source).await?;
                let mut archiver = Archiver::new();
                archiver.add_node(&tree);
                let options = GenerateOptions {
                    output: OutputType::Bytes,
                    compression: config.compression,
                };
                let archive = archiver
                    .generate(&options)
                    .context(ArchiveGenerationSnafu)?;
                Self::write_output(&output, archive.as_bytes().to_vec()).await?;
            }
            Command::Export {
                container,
                path,
                output,
                format,
            } => {
                let fs = DirFs::new(container);
                let directory = TreeReader::for_archive(&fs)
                    .with_root_name(config.project_name.clone())
                    .read_tree(&path)
                    .await
                    .context(ReadContainerSnafu)?;
                let mut archiver = Archiver::new();
                archiver.add_directory(&directory);
                let options = GenerateOptions {
                    output: format.into(),
                    compression: config.compression,
                };
                let archive = archiver
                    .generate(&options)
                    .context(ArchiveGenerationSnafu)?;
                Self::write_output(&output, archive.as_bytes().to_vec()).await?;
            }
            Command::Tree { container, path } => {
                let fs = DirFs::new(container);
                let display = TreeReader::new(&fs)
                    .read_display_tree(&path, &mut SequentialKeys::default())
                    .await
                    .context(ReadContainerSnafu)?;
                print!("{}", render_display_tree(&display));
            }
            Command::Snapshot { container, output } => {
                let fs = DirFs::new(container);
                let snapshot = Snapshot::capture(&fs).await.context(SnapshotFileSnafu)?;
                snapshot.write(&output).await.context(SnapshotFileSnafu)?;
                info!(
                    "Saved {} files to {}",
                    snapshot.tree().file_count(),
                    output.best_effort_path_display()
                );
            }
            Command::Restore {
                snapshot,
                container,
            } => {
                let snapshot = Snapshot::read(&snapshot).await.context(SnapshotFileSnafu)?;
                let fs = Self::create_container(&container).await?;
                snapshot.restore(&fs).await.context(SnapshotFileSnafu)?;
            }
            Command::Touch { path, container } => {
                let fs = Self::create_container(&container).await?;
                SyncWriter::new(&fs)
                    .create_file(&path)
                    .await
                    .context(WriteContainerSnafu)?;
            }
            Command::Write {
                path,
                content,
                container,
            } => {
                let fs = Self::create_container(&container).await?;
                SyncWriter::new(&fs)
                    .write_file(&path, &content)
                    .await
                    .context(WriteContainerSnafu)?;
            }
            Command::Rm { path, container } => {
                let fs = DirFs::new(container);
                SyncWriter::new(&fs)
                    .remove(&path)
                    .await
                    .context(WriteContainerSnafu)?;
            }
            Command::Rename {
                path,
                new_name,
                container,
            } => {
                let fs = DirFs::new(container);
                let new_path = SyncWriter::new(&fs)
                    .rename(&path, &new_name)
                    .await
                    .context(WriteContainerSnafu)?;
                println!("{new_path}");
            }
        }

        Ok(())
    }

    async fn build_tree(config: &SyncConfig, source: &Path) -> Result<Node, ApplicationError> {
        let builder = TreeBuilder::new(config.exclusions.clone());
        let mut current = CurrentDirectory::new();
        let tree = builder
            .get_directory(&PathPicker::new(source), &mut current)
            .await
            .context(BuildTreeSnafu)?
            .context(NoDirectorySnafu {
                path: source.best_effort_path_display(),
            })?;
        Ok(tree.as_ref().clone())
    }

    async fn create_container(container: &Path) -> Result<DirFs, ApplicationError> {
        DirFs::create(container).await.context(OpenContainerSnafu {
            path: container.best_effort_path_display(),
        })
    }

    async fn write_output(output: &Path, bytes: Vec<u8>) -> Result<(), ApplicationError> {
        debug!(
            "Writing {} bytes to {}",
            bytes.len(),
            output.best_effort_path_display()
        );
        fs::write(output, bytes).await.0.context(WriteOutputSnafu {
            path: output.to_path_buf(),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    LoadConfigError { source: ConfigError },
    #[snafu(display("Failed to build the source tree"))]
    BuildTreeError { source: BuildError },
    #[snafu(display("No directory could be opened at {}", path))]
    NoDirectoryError { path: String },
    #[snafu(display("Failed to open the container at {}", path))]
    OpenContainerError { path: String, source: VfsError },
    #[snafu(display("Failed to update the container"))]
    WriteContainerError { source: SyncError },
    #[snafu(display("Failed to read the container"))]
    ReadContainerError { source: ReadError },
    #[snafu(display("Failed to generate the archive"))]
    ArchiveGenerationError,
    #[snafu(display("Failed to write {}", path.best_effort_path_display()))]
    WriteOutputError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Snapshot operation failed"))]
    SnapshotFileError { source: SnapshotError },
}
