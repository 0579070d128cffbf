use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::{ArchiveFormat, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The project directory holding treesync.yaml
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy a local directory into a container
    Sync {
        source: PathBuf,
        #[clap(long, short)]
        container: PathBuf,
    },
    /// Archive a local directory into a zip file
    Pack {
        source: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Archive a container subtree into a zip file
    Export {
        #[clap(long, short)]
        container: PathBuf,
        #[clap(long, short, default_value = "/")]
        path: String,
        #[clap(long, short)]
        output: PathBuf,
        #[clap(long, short, default_value = "bytes", value_enum)]
        format: ArchiveFormat,
    },
    /// Print a container subtree
    Tree {
        #[clap(long, short)]
        container: PathBuf,
        #[clap(long, short, default_value = "/")]
        path: String,
    },
    /// Save a container into a snapshot file
    Snapshot {
        #[clap(long, short)]
        container: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Seed a container from a snapshot file
    Restore {
        snapshot: PathBuf,
        #[clap(long, short)]
        container: PathBuf,
    },
    /// Create an empty file in a container
    Touch {
        path: String,
        #[clap(long, short)]
        container: PathBuf,
    },
    /// Write text to a file in a container
    Write {
        path: String,
        content: String,
        #[clap(long, short)]
        container: PathBuf,
    },
    /// Remove a file or directory from a container
    Rm {
        path: String,
        #[clap(long, short)]
        container: PathBuf,
    },
    /// Rename a file in a container, keeping its directory
    Rename {
        path: String,
        new_name: String,
        #[clap(long, short)]
        container: PathBuf,
    },
}
