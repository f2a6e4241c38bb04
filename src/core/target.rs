//! Build graph targets.
//!
//! A target is a node in the build graph: a first-party binary or library
//! rooted under the local source root, or a remote library declared under the
//! third-party root. Targets own an ordered, deduplicated dependency list;
//! buildgen only ever appends to it.

use crate::core::address::Address;

/// The kind of a build target.
///
/// A closed set: kind checks compare variant tags rather than inspecting
/// runtime types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// First-party executable (a `package main` directory).
    Binary,

    /// First-party importable library.
    Library,

    /// Third-party library declared under the remote root.
    RemoteLibrary {
        /// Sub-package import path below the install root, e.g. `prod` for
        /// the import `pantsbuild.org/fake/prod`. Empty when the install
        /// root itself is imported.
        pkg: String,

        /// Pinned revision. Empty means floating.
        rev: String,
    },
}

impl TargetKind {
    /// Short human-readable label for error messages and declarations.
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Binary => "go_binary",
            TargetKind::Library => "go_library",
            TargetKind::RemoteLibrary { .. } => "go_remote_library",
        }
    }

    /// Check if this is a remote library.
    pub fn is_remote(&self) -> bool {
        matches!(self, TargetKind::RemoteLibrary { .. })
    }

    /// Check if this is a first-party (local source) kind.
    pub fn is_local(&self) -> bool {
        matches!(self, TargetKind::Binary | TargetKind::Library)
    }
}

/// A node in the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    address: Address,
    kind: TargetKind,
    dependencies: Vec<Address>,
}

impl Target {
    /// Create a new target with no dependencies.
    pub fn new(address: Address, kind: TargetKind) -> Self {
        Target {
            address,
            kind,
            dependencies: Vec::new(),
        }
    }

    /// This target's address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// This target's kind.
    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    /// Ordered dependency addresses.
    pub fn dependencies(&self) -> &[Address] {
        &self.dependencies
    }

    /// Append a dependency edge unless it is already present.
    ///
    /// Returns `true` if the edge was added. Edges have set semantics:
    /// duplicate imports across files or import categories collapse onto a
    /// single edge.
    pub fn add_dependency(&mut self, dep: Address) -> bool {
        if self.dependencies.contains(&dep) {
            false
        } else {
            self.dependencies.push(dep);
            true
        }
    }

    /// The pinned revision, for remote libraries.
    pub fn rev(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::RemoteLibrary { rev, .. } => Some(rev.as_str()),
            _ => None,
        }
    }

    /// The sub-package path, for remote libraries.
    pub fn pkg(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::RemoteLibrary { pkg, .. } => Some(pkg.as_str()),
            _ => None,
        }
    }
}
