//! The target graph store.
//!
//! On-disk declaration files and in-memory targets are two views of one
//! logical store. The graph fronts both: lookups read through to disk,
//! loading any declarations found into memory, and newly created targets are
//! held in memory until the materializer writes them back. The graph never
//! deletes a target and never rewrites an existing dependency list except by
//! appending.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

use crate::core::address::Address;
use crate::core::target::Target;
use crate::decl;
use crate::util::fs as ufs;

/// The build graph over all known targets, keyed by address.
#[derive(Debug)]
pub struct TargetGraph {
    build_root: PathBuf,
    /// Declaration file names recognized on disk, default name first.
    decl_filenames: Vec<String>,
    targets: BTreeMap<Address, Target>,
    /// Directories whose declarations have already been read through.
    loaded_dirs: HashSet<String>,
}

impl TargetGraph {
    /// Create a graph over `build_root` recognizing only the default
    /// declaration file name.
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self::with_extension(build_root, "")
    }

    /// Create a graph that also recognizes declaration files written with a
    /// custom extension.
    pub fn with_extension(build_root: impl Into<PathBuf>, extension: &str) -> Self {
        let mut decl_filenames = vec![decl::DEFAULT_FILENAME.to_string()];
        if !extension.is_empty() {
            decl_filenames.push(format!("{}{}", decl::DEFAULT_FILENAME, extension));
        }
        TargetGraph {
            build_root: build_root.into(),
            decl_filenames,
            targets: BTreeMap::new(),
            loaded_dirs: HashSet::new(),
        }
    }

    /// The workspace build root.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// The target at `address`, considering only what is in memory.
    pub fn target_at(&self, address: &Address) -> Option<&Target> {
        self.targets.get(address)
    }

    /// The target at `address`, reading through to on-disk declarations.
    pub fn lookup(&mut self, address: &Address) -> Result<Option<&Target>> {
        if !self.targets.contains_key(address) {
            self.load_declarations(address.path())?;
        }
        Ok(self.targets.get(address))
    }

    /// Read any declaration files in `dir` into memory.
    ///
    /// In-memory targets win over their on-disk declarations: a target
    /// injected earlier in the run may carry state (a pinned revision, wired
    /// edges) the minimal declaration does not.
    pub fn load_declarations(&mut self, dir: &str) -> Result<()> {
        if !self.loaded_dirs.insert(dir.to_string()) {
            return Ok(());
        }
        for filename in &self.decl_filenames {
            let path = self.build_root.join(dir).join(filename);
            if !path.is_file() {
                continue;
            }
            let parsed = decl::parse(&ufs::read_to_string(&path)?);
            for declaration in parsed.declarations {
                let target = declaration.into_target(dir);
                if !self.targets.contains_key(target.address()) {
                    debug!(address = %target.address(), file = %path.display(), "loaded declaration");
                    self.targets.insert(target.address().clone(), target);
                }
            }
        }
        Ok(())
    }

    /// Add a new target to the graph.
    ///
    /// Fails if a target already exists at the address; buildgen never
    /// replaces targets.
    pub fn create_target(&mut self, target: Target) -> Result<Address> {
        let address = target.address().clone();
        if self.targets.contains_key(&address) {
            bail!("target already exists at address `{}`", address);
        }
        debug!(address = %address, kind = target.kind().label(), "created target");
        self.targets.insert(address.clone(), target);
        Ok(address)
    }

    /// Append a dependency edge, deduplicated. Returns whether it was new.
    pub fn add_dependency(&mut self, address: &Address, dep: Address) -> Result<bool> {
        let Some(target) = self.targets.get_mut(address) else {
            bail!("cannot add dependency to unknown target `{}`", address);
        };
        Ok(target.add_dependency(dep))
    }

    /// All targets in deterministic address order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Targets whose declaration lives in `dir`.
    pub fn targets_in_dir<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a Target> {
        self.targets
            .values()
            .filter(move |t| t.address().path() == dir)
    }

    /// Number of targets known to the graph.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the graph holds no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
