mod sync_config;

pub use sync_config::{CONFIG_FILE_NAME, ConfigError, SyncConfig};
