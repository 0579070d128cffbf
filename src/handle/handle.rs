use derive_more::Display;
use futures::Stream;
use snafu::Snafu;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HandleKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// A reference to a file or directory inside some external source.
pub trait FileSystemHandle: Sized {
    fn name(&self) -> &str;

    fn kind(&self) -> HandleKind;

    /// Child handles in source order. Only meaningful for directories.
    fn entries(&self) -> impl Stream<Item = Result<Self, HandleError>> + '_;

    /// Full text content of a file, `None` when the read yields nothing.
    async fn read_text(&self) -> Result<Option<String>, HandleError>;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HandleError {
    #[snafu(display("Failed to enumerate directory '{}'", handle))]
    EnumerateError {
        handle: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read file '{}'", handle))]
    ReadError {
        handle: String,
        source: std::io::Error,
    },
    #[snafu(display("Handle '{}' is no longer accessible", handle))]
    RevokedError { handle: String },
}
