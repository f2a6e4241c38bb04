//! Shared utilities.

pub mod config;
pub mod fs;

pub use config::{BuildgenOptions, Config, RootsConfig};
