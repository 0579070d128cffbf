mod archive_format;
mod log_level;

pub use archive_format::ArchiveFormat;
pub use log_level::LogLevel;
