//! Core build graph model.

pub mod address;
pub mod graph;
pub mod package;
pub mod target;

pub use address::Address;
pub use graph::TargetGraph;
pub use package::{ImportSets, Package, PackageShape};
pub use target::{Target, TargetKind};
