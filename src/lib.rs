//! Gostitch - a BUILD file generator for GOPATH-style Go source trees.
//!
//! This crate provides the core library functionality for gostitch:
//! locating workspace roots, classifying import paths, stitching dependency
//! edges through the target graph, and materializing synthesized target
//! declarations to disk.

pub mod buildgen;
pub mod core;
pub mod decl;
pub mod fetcher;
pub mod imports;
pub mod util;

pub use buildgen::{Buildgen, BuildgenError, GenerationCause, StitchReport};
pub use core::{Address, Target, TargetGraph, TargetKind};
pub use fetcher::{Fetcher, FetcherFactory, PatternFetcherFactory};
pub use imports::{GoImportExtractor, ImportExtractor};
pub use util::Config;
