//! Build generation.
//!
//! One run: locate the workspace roots, seed a traversal from the given
//! entry points (or from every package under the local root when none are
//! given), stitch dependency edges through the target graph, then optionally
//! materialize synthesized declarations back to disk. Running twice against
//! unchanged state is a no-op.

pub mod classify;
pub mod errors;
pub mod materialize;
pub mod roots;
pub mod stitch;

use std::path::PathBuf;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::address::Address;
use crate::core::graph::TargetGraph;
use crate::core::target::Target;
use crate::fetcher::{FetcherFactory, PatternFetcherFactory};
use crate::imports::{has_go_sources, GoImportExtractor, ImportExtractor};
use crate::util::config::Config;
use crate::util::fs as ufs;

pub use errors::{BuildgenError, GenerationCause};
pub use stitch::StitchReport;

/// A configured build generation run.
pub struct Buildgen {
    build_root: PathBuf,
    config: Config,
    extractor: Box<dyn ImportExtractor>,
    fetchers: Box<dyn FetcherFactory>,
}

impl Buildgen {
    /// Create a run over `build_root` with the default Go source scanner and
    /// fetcher conventions.
    pub fn new(build_root: impl Into<PathBuf>, config: Config) -> Self {
        Buildgen {
            build_root: build_root.into(),
            config,
            extractor: Box::new(GoImportExtractor::new()),
            fetchers: Box::new(PatternFetcherFactory),
        }
    }

    /// Substitute the import extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn ImportExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Substitute the fetcher factory.
    pub fn with_fetcher_factory(mut self, fetchers: Box<dyn FetcherFactory>) -> Self {
        self.fetchers = fetchers;
        self
    }

    /// A target graph suitable for this run's declaration file conventions.
    pub fn new_graph(&self) -> TargetGraph {
        TargetGraph::with_extension(&self.build_root, &self.config.buildgen.extension)
    }

    /// Execute the run against `graph`.
    ///
    /// `entry_points` are the explicit target roots; when empty, every
    /// first-party package under the local root is visited. On success the
    /// graph covers everything reachable from the run's entry points and the
    /// report describes what changed.
    pub fn execute(
        &self,
        graph: &mut TargetGraph,
        entry_points: &[Address],
    ) -> Result<StitchReport, BuildgenError> {
        let mut report = StitchReport::default();

        // Entry points that do not resolve to a first-party target are not
        // ours to generate for.
        let mut applicable = Vec::new();
        for address in entry_points {
            match graph.lookup(address)? {
                Some(target) if target.kind().is_local() => applicable.push(address.clone()),
                Some(_) => debug!(target = %address, "skipping non-local entry point"),
                None => warn!(target = %address, "entry point does not resolve to a target"),
            }
        }
        if !entry_points.is_empty() && applicable.is_empty() {
            debug!("no applicable entry points; nothing to generate");
            return Ok(report);
        }

        let workspace_roots = roots::locate(&self.build_root, &self.config.roots)?;

        let (seeds, local_root) = if entry_points.is_empty() {
            let Some(local_root) = workspace_roots.local.clone() else {
                debug!("no local source root and no entry points; nothing to generate");
                return Ok(report);
            };
            (
                self.seed_from_scan(graph, &local_root, &mut report)?,
                local_root,
            )
        } else {
            let Some(local_root) = workspace_roots.local.clone() else {
                return Err(BuildgenError::NoLocalRoots);
            };
            (
                self.seed_from_entry_points(applicable, &local_root)?,
                local_root,
            )
        };

        let stitcher = stitch::GraphStitcher::new(
            graph,
            local_root,
            workspace_roots.remote.clone(),
            self.config.buildgen.remote,
            self.extractor.as_ref(),
            self.fetchers.as_ref(),
        );
        stitcher.stitch(seeds, &mut report)?;

        if self.config.buildgen.fail_floating {
            self.check_floating(graph, &report)?;
        }

        if self.config.buildgen.materialize {
            let materializer =
                materialize::Materializer::new(&self.build_root, &self.config.buildgen);
            let stats = materializer
                .materialize(graph, &report)
                .map_err(BuildgenError::Other)?;
            report.files_written = stats.files_written;
            report.files_removed = stats.files_removed;
        }

        info!(
            visited = report.visited.len(),
            synthesized = report.synthesized.len(),
            new_edges = report.new_edges,
            files_written = report.files_written,
            "build generation complete"
        );
        Ok(report)
    }

    /// Seed the worklist from explicit entry points, verifying each is
    /// rooted under the local root.
    fn seed_from_entry_points(
        &self,
        applicable: Vec<Address>,
        local_root: &str,
    ) -> Result<Vec<(Address, String)>, BuildgenError> {
        let mut seeds = Vec::new();
        for address in applicable {
            if !roots::is_under(address.path(), local_root) {
                return Err(BuildgenError::UnrootedLocalSource {
                    address,
                    local_root: local_root.to_string(),
                });
            }
            let rel_path = address
                .path()
                .strip_prefix(local_root)
                .unwrap_or(address.path())
                .trim_start_matches('/')
                .to_string();
            seeds.push((address, rel_path));
        }
        Ok(seeds)
    }

    /// Seed the worklist from every package directory under the local root,
    /// synthesizing targets (with shape-implied kinds) where no declaration
    /// exists in memory or on disk.
    fn seed_from_scan(
        &self,
        graph: &mut TargetGraph,
        local_root: &str,
        report: &mut StitchReport,
    ) -> Result<Vec<(Address, String)>, BuildgenError> {
        let local_root_dir = self.build_root.join(local_root);
        let mut seeds = Vec::new();

        let walker = WalkDir::new(&local_root_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry.map_err(|e| BuildgenError::Other(e.into()))?;
            if !entry.file_type().is_dir() || !has_go_sources(entry.path()) {
                continue;
            }
            let Some(rel_path) = ufs::relative_str(&local_root_dir, entry.path()) else {
                continue;
            };
            // The root itself is not a package.
            if rel_path.is_empty() {
                continue;
            }

            let address = Address::from_dir(format!("{}/{}", local_root, rel_path));
            if graph.lookup(&address)?.is_none() {
                let package = self
                    .extractor
                    .scan_package(entry.path(), &rel_path)
                    .map_err(BuildgenError::Other)?;
                graph.create_target(Target::new(
                    address.clone(),
                    package.shape.expected_kind(),
                ))?;
                report.synthesized.push(address.clone());
            }
            seeds.push((address, rel_path));
        }

        Ok(seeds)
    }

    /// Every remote library this run synthesized must be pinned.
    ///
    /// Only synthesized remotes count: a pre-existing unpinned declaration
    /// the run merely reuses is the workspace's standing state, not something
    /// this run generated. Checked after the whole graph for the run is
    /// known, so every floating library is reported at once rather than just
    /// the first.
    fn check_floating(
        &self,
        graph: &TargetGraph,
        report: &StitchReport,
    ) -> Result<(), BuildgenError> {
        let floating: Vec<Address> = report
            .synthesized
            .iter()
            .filter(|address| {
                graph
                    .target_at(address)
                    .and_then(Target::rev)
                    .is_some_and(str::is_empty)
            })
            .cloned()
            .collect();
        if floating.is_empty() {
            Ok(())
        } else {
            Err(BuildgenError::FloatingRemotes(floating))
        }
    }
}
