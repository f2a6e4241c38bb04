//! The graph stitcher.
//!
//! Walks a worklist of first-party packages, classifies their imports,
//! resolves each import to an existing or newly synthesized target, and
//! wires dependency edges. Traversal is an explicit queue plus visited-set:
//! each package is processed at most once, so the walk terminates on any
//! import graph, cyclic or not, and a revisit is a no-op rather than a
//! re-traversal.

use std::collections::{HashMap, HashSet, VecDeque};
use std::mem::discriminant;

use tracing::debug;

use crate::buildgen::classify::{Classifier, ClassifyError, ImportClass};
use crate::buildgen::errors::{BuildgenError, GenerationCause};
use crate::core::address::{basename, Address};
use crate::core::graph::TargetGraph;
use crate::core::target::{Target, TargetKind};
use crate::fetcher::FetcherFactory;
use crate::imports::ImportExtractor;

/// What a run did: the traversal closure plus any mutations.
#[derive(Debug, Default)]
pub struct StitchReport {
    /// First-party targets processed, in traversal order.
    pub visited: Vec<Address>,

    /// Remote library targets depended on by this run.
    pub remotes: Vec<Address>,

    /// Targets created by this run (local and remote).
    pub synthesized: Vec<Address>,

    /// Dependency edges added by this run.
    pub new_edges: usize,

    /// Declaration files written by the materializer.
    pub files_written: usize,

    /// Declaration files removed by the materializer (extension migration).
    pub files_removed: usize,
}

impl StitchReport {
    /// Whether the run changed any durable state.
    ///
    /// Edges do not count: local declarations never carry dependency lists,
    /// so a run always re-derives them into whatever in-memory graph it was
    /// given. A run is a no-op when it synthesized no targets and touched no
    /// files.
    pub fn is_noop(&self) -> bool {
        self.synthesized.is_empty() && self.files_written == 0 && self.files_removed == 0
    }
}

/// Core traversal state for one run.
pub struct GraphStitcher<'a> {
    graph: &'a mut TargetGraph,
    /// Build-root-relative local source root.
    local_root: String,
    /// Build-root-relative remote root, when one exists.
    remote_root: Option<String>,
    remote_enabled: bool,
    extractor: &'a dyn ImportExtractor,
    fetchers: &'a dyn FetcherFactory,
    /// One remote target per distinct install root per run.
    remote_cache: HashMap<String, Address>,
}

impl<'a> GraphStitcher<'a> {
    pub fn new(
        graph: &'a mut TargetGraph,
        local_root: String,
        remote_root: Option<String>,
        remote_enabled: bool,
        extractor: &'a dyn ImportExtractor,
        fetchers: &'a dyn FetcherFactory,
    ) -> Self {
        GraphStitcher {
            graph,
            local_root,
            remote_root,
            remote_enabled,
            extractor,
            fetchers,
            remote_cache: HashMap::new(),
        }
    }

    /// Process the worklist seeded with `(target, local-root-relative
    /// package path)` pairs, appending results to `report`.
    pub fn stitch(
        mut self,
        seeds: Vec<(Address, String)>,
        report: &mut StitchReport,
    ) -> Result<(), BuildgenError> {
        let classifier = Classifier::new(
            self.graph.build_root().join(&self.local_root),
            self.remote_enabled,
            self.fetchers,
        );

        let mut worklist: VecDeque<(Address, String)> = seeds.into();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some((address, rel_path)) = worklist.pop_front() {
            if !visited.insert(rel_path.clone()) {
                continue;
            }
            debug!(package = %rel_path, target = %address, "visiting package");

            let dir = self
                .graph
                .build_root()
                .join(&self.local_root)
                .join(&rel_path);
            let package = self
                .extractor
                .scan_package(&dir, &rel_path)
                .map_err(BuildgenError::Other)?;

            self.check_kind(&address, &rel_path, package.shape.expected_kind())?;

            for import in package.imports.all() {
                let class = classifier.classify(import).map_err(|e| match e {
                    ClassifyError::Cause(cause) => BuildgenError::Generation {
                        address: address.clone(),
                        cause,
                    },
                    ClassifyError::Other(e) => BuildgenError::Other(e),
                })?;

                let dep = match class {
                    ImportClass::Ignore => continue,
                    ImportClass::Local(local_rel) => {
                        let dep = self.resolve_local(&local_rel, report)?;
                        if !visited.contains(&local_rel) {
                            worklist.push_back((dep.clone(), local_rel));
                        }
                        dep
                    }
                    ImportClass::Remote { root, pkg } => {
                        self.resolve_remote(&address, &root, &pkg, report)?
                    }
                };

                if self.graph.add_dependency(&address, dep.clone())? {
                    debug!(from = %address, to = %dep, "added dependency edge");
                    report.new_edges += 1;
                }
            }

            report.visited.push(address);
        }

        Ok(())
    }

    /// Fail when a declared target's kind contradicts its package's shape.
    fn check_kind(
        &self,
        address: &Address,
        rel_path: &str,
        expected: TargetKind,
    ) -> Result<(), BuildgenError> {
        let Some(target) = self.graph.target_at(address) else {
            return Err(BuildgenError::Other(anyhow::anyhow!(
                "worklist target `{}` missing from the graph",
                address
            )));
        };
        if discriminant(target.kind()) != discriminant(&expected) {
            return Err(BuildgenError::Generation {
                address: address.clone(),
                cause: GenerationCause::WrongTargetType {
                    package: rel_path.to_string(),
                    expected: expected.label(),
                    actual: target.kind().label(),
                },
            });
        }
        Ok(())
    }

    /// Resolve a local import to its target, synthesizing a library when no
    /// declaration exists. Imported packages are never binaries; only
    /// explicitly declared entry points are.
    fn resolve_local(
        &mut self,
        local_rel: &str,
        report: &mut StitchReport,
    ) -> Result<Address, BuildgenError> {
        let address = Address::from_dir(format!("{}/{}", self.local_root, local_rel));
        if self.graph.lookup(&address)?.is_none() {
            self.graph
                .create_target(Target::new(address.clone(), TargetKind::Library))?;
            report.synthesized.push(address.clone());
        }
        Ok(address)
    }

    /// Resolve a remote import's install root to its one target for the run.
    ///
    /// Reuses a matching target already in memory or declared on disk,
    /// preserving its pinned revision verbatim; otherwise synthesizes a
    /// floating remote library.
    fn resolve_remote(
        &mut self,
        importer: &Address,
        root: &str,
        pkg: &str,
        report: &mut StitchReport,
    ) -> Result<Address, BuildgenError> {
        if let Some(address) = self.remote_cache.get(root) {
            return Ok(address.clone());
        }

        let import = if pkg.is_empty() {
            root.to_string()
        } else {
            format!("{}/{}", root, pkg)
        };
        let Some(remote_root) = self.remote_root.clone() else {
            return Err(BuildgenError::Generation {
                address: importer.clone(),
                cause: GenerationCause::MissingRemoteRoot { import },
            });
        };

        let dir = format!("{}/{}", remote_root, root);
        self.graph.load_declarations(&dir)?;

        let existing = self
            .graph
            .targets_in_dir(&dir)
            .find(|t| t.pkg() == Some(pkg))
            .map(|t| t.address().clone());

        let address = match existing {
            Some(address) => address,
            None => {
                let name = if pkg.is_empty() {
                    basename(&dir).to_string()
                } else {
                    pkg.to_string()
                };
                let address = Address::new(dir, name);
                self.graph.create_target(Target::new(
                    address.clone(),
                    TargetKind::RemoteLibrary {
                        pkg: pkg.to_string(),
                        rev: String::new(),
                    },
                ))?;
                report.synthesized.push(address.clone());
                address
            }
        };

        if !report.remotes.contains(&address) {
            report.remotes.push(address.clone());
        }
        self.remote_cache.insert(root.to_string(), address.clone());
        Ok(address)
    }
}
