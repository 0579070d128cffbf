use clap::ValueEnum;

use crate::archive::OutputType;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ArchiveFormat {
    #[default]
    Bytes,
    Base64,
}

impl From<ArchiveFormat> for OutputType {
    fn from(format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::Bytes => OutputType::Bytes,
            ArchiveFormat::Base64 => OutputType::Base64,
        }
    }
}
