//! First-party source packages.
//!
//! A package is a directory of Go source files under the local root. Its
//! local-root-relative path doubles as its import path. Packages are
//! ephemeral: they are rescanned from the filesystem on every run.

use std::collections::BTreeSet;

use crate::core::target::TargetKind;

/// The on-disk shape of a package, derived from its package clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageShape {
    /// At least one non-test file declares `package main`.
    Main,

    /// An importable library package.
    Library,
}

impl PackageShape {
    /// The target kind this shape implies.
    ///
    /// A pure function: a `main` package must back a binary target, anything
    /// else a library target.
    pub fn expected_kind(self) -> TargetKind {
        match self {
            PackageShape::Main => TargetKind::Binary,
            PackageShape::Library => TargetKind::Library,
        }
    }
}

/// The import sets extracted from a package's sources.
///
/// Sets are ordered so traversal over them is deterministic for a fixed
/// filesystem state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSets {
    /// Imports of non-test files.
    pub normal: BTreeSet<String>,

    /// Imports of white-box `_test.go` files (same package clause).
    pub test: BTreeSet<String>,

    /// Imports of black-box `_test.go` files (`<pkg>_test` package clause).
    pub external_test: BTreeSet<String>,
}

impl ImportSets {
    /// All imports across the three categories, deduplicated and ordered.
    ///
    /// Test and external-test imports contribute edges to the same target as
    /// normal imports; buildgen does not split out test targets.
    pub fn all(&self) -> BTreeSet<&str> {
        self.normal
            .iter()
            .chain(self.test.iter())
            .chain(self.external_test.iter())
            .map(String::as_str)
            .collect()
    }

    /// Whether no imports were found at all.
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.test.is_empty() && self.external_test.is_empty()
    }
}

/// A scanned first-party package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Path relative to the local root; also the package's import path.
    pub rel_path: String,

    /// Shape implied by the package clauses.
    pub shape: PackageShape,

    /// Extracted import sets.
    pub imports: ImportSets,
}
