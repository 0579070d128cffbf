#![allow(async_fn_in_trait)]
#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod archive;
pub mod builder;
pub mod cli;
pub mod config;
pub mod ext;
pub mod handle;
pub mod reader;
pub mod snapshot;
pub mod sync;
pub mod tree;
pub mod vfs;
