use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::archive::{ArchiveError, Compression};
use crate::ext::BestEffortPathExt;
use crate::reader::DEFAULT_PROJECT_NAME;
use crate::tree::Exclusions;

pub const CONFIG_FILE_NAME: &str = "treesync.yaml";

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Project settings from `treesync.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub project_name: String,
    pub exclusions: Exclusions,
    pub compression: Compression,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            exclusions: Exclusions::default(),
            compression: Compression::default(),
        }
    }
}

impl SyncConfig {
    /// Reads `treesync.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        let path = get_config_file_path(root);
        debug!("Opening config file: {}", path.best_effort_path_display());
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!("Successfully read config file: {} bytes", bytes.len());
                Self::try_from(&*String::from_utf8_lossy(&bytes))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(Self::default())
            }
            Err(error) => Err(error).context(ReadSnafu {
                file_path: path.best_effort_path_display(),
            }),
        }
    }

    fn parse_exclusions(
        top_level: &LinkedHashMap<Yaml<'_>, Yaml<'_>>,
    ) -> Result<Exclusions, ConfigError> {
        let Some(exclude) = top_level.get(&key("exclude")) else {
            return Ok(Exclusions::default());
        };
        let names = exclude
            .as_sequence()
            .ok_or(ConfigError::ExcludeNotSequence)?
            .iter()
            .filter_map(|item| {
                let name = item.as_str();
                if name.is_none() {
                    debug!("Skipping non-string exclude entry: {:?}", item);
                }
                name.map(str::to_string)
            })
            .collect::<Vec<_>>();
        Ok(Exclusions::with_extra(names))
    }

    fn parse_compression(
        top_level: &LinkedHashMap<Yaml<'_>, Yaml<'_>>,
    ) -> Result<Compression, ConfigError> {
        let Some(archive) = top_level.get(&key("archive")) else {
            return Ok(Compression::default());
        };
        let archive = archive.as_mapping().ok_or(ConfigError::ArchiveNotMap)?;
        match archive.get(&key("compression")).and_then(|value| value.as_str()) {
            Some(name) => name.parse().context(UnknownCompressionSnafu),
            None => Ok(Compression::default()),
        }
    }
}

impl TryFrom<&str> for SyncConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };
        let top_level = document.as_mapping().ok_or(ConfigError::TopLevelNotMap)?;

        let project_name = match top_level.get(&key("project_name")) {
            Some(value) => value
                .as_str()
                .ok_or(ConfigError::MalformedConfig)?
                .to_string(),
            None => DEFAULT_PROJECT_NAME.to_string(),
        };

        Ok(SyncConfig {
            project_name,
            exclusions: Self::parse_exclusions(top_level)?,
            compression: Self::parse_compression(top_level)?,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("project_name should be a string"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("exclude should be a list of directory names"))]
    ExcludeNotSequence,
    #[snafu(display("archive section should be a map"))]
    ArchiveNotMap,
    #[snafu(display("Invalid archive compression"))]
    UnknownCompression { source: ArchiveError },
}
