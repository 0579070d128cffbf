mod sync_writer;

pub use sync_writer::{SyncError, SyncSummary, SyncWriter};
