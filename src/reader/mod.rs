mod tree_reader;

pub use tree_reader::{DEFAULT_PROJECT_NAME, ReadError, ReadOptions, TreeReader, save_file_system_tree};
