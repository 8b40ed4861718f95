//! Report rendering.

pub mod generator;

pub use generator::{write_files_list, write_report};
