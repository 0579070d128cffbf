mod application;
pub mod data;
mod runtime_config;
mod tree_printer;

pub use application::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
pub use tree_printer::{enable_colors, render_display_tree};
