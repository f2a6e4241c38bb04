//! Declaration materialization.
//!
//! Persists the declarations for a run's targets to disk. Writes are
//! idempotent and append-only at the directory level: a declaration already
//! present is left untouched, unrelated content is never truncated, and a
//! file is only rewritten when it is missing declarations. When a custom
//! extension is configured, a default-named file that holds nothing but this
//! run's declarations is replaced by the extension-named file, so a
//! directory never ends up with two ambiguous declaration files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::buildgen::stitch::StitchReport;
use crate::core::graph::TargetGraph;
use crate::decl::{self, Declaration};
use crate::util::config::BuildgenOptions;
use crate::util::fs as ufs;

/// Writes declarations for a completed run.
pub struct Materializer<'a> {
    build_root: &'a Path,
    options: &'a BuildgenOptions,
}

/// File mutations performed.
#[derive(Debug, Default)]
pub struct MaterializeStats {
    pub files_written: usize,
    pub files_removed: usize,
}

impl<'a> Materializer<'a> {
    pub fn new(build_root: &'a Path, options: &'a BuildgenOptions) -> Self {
        Materializer {
            build_root,
            options,
        }
    }

    /// Materialize every local target visited and every remote target
    /// depended on by the run.
    pub fn materialize(
        &self,
        graph: &TargetGraph,
        report: &StitchReport,
    ) -> Result<MaterializeStats> {
        // Desired declarations grouped by directory, deduplicated in
        // traversal order.
        let mut by_dir: BTreeMap<&str, Vec<Declaration>> = BTreeMap::new();
        for address in report.visited.iter().chain(report.remotes.iter()) {
            let Some(target) = graph.target_at(address) else {
                continue;
            };
            let declaration = Declaration::for_target(target);
            let declarations = by_dir.entry(address.path()).or_default();
            if !declarations.contains(&declaration) {
                declarations.push(declaration);
            }
        }

        let mut stats = MaterializeStats::default();
        for (dir, desired) in &by_dir {
            self.materialize_dir(dir, desired, &mut stats)?;
        }
        Ok(stats)
    }

    fn materialize_dir(
        &self,
        dir: &str,
        desired: &[Declaration],
        stats: &mut MaterializeStats,
    ) -> Result<()> {
        let dir_path = self.build_root.join(dir);
        let decl_path = dir_path.join(self.options.decl_filename());

        if self.options.has_custom_extension() {
            self.migrate_default_file(&dir_path, desired, stats)?;
        }

        let existing = if decl_path.is_file() {
            Some(ufs::read_to_string(&decl_path)?)
        } else {
            None
        };
        let present = existing.as_deref().map(decl::parse).unwrap_or_default();

        let missing: Vec<&Declaration> = desired
            .iter()
            .filter(|d| !present.declarations.contains(d))
            .collect();
        if missing.is_empty() {
            debug!(file = %decl_path.display(), "declarations up to date");
            return Ok(());
        }

        let mut content = existing.unwrap_or_default();
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        for declaration in missing {
            content.push_str(&declaration.render());
            content.push('\n');
        }

        debug!(file = %decl_path.display(), "writing declarations");
        ufs::write_string(&decl_path, &content)?;
        stats.files_written += 1;
        Ok(())
    }

    /// Replace a default-named declaration file that holds only this run's
    /// declarations; leave it alone if it carries anything else.
    fn migrate_default_file(
        &self,
        dir_path: &Path,
        desired: &[Declaration],
        stats: &mut MaterializeStats,
    ) -> Result<()> {
        let default_path = dir_path.join(decl::DEFAULT_FILENAME);
        if !default_path.is_file() {
            return Ok(());
        }
        let parsed = decl::parse(&ufs::read_to_string(&default_path)?);
        let only_ours =
            !parsed.has_unrelated && parsed.declarations.iter().all(|d| desired.contains(d));
        if only_ours {
            debug!(file = %default_path.display(), "replacing default-named declaration file");
            ufs::remove_file_if_exists(&default_path)?;
            stats.files_removed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::Address;
    use crate::core::target::{Target, TargetKind};
    use std::fs;
    use tempfile::TempDir;

    fn run_materializer(
        tmp: &TempDir,
        options: &BuildgenOptions,
        targets: Vec<Target>,
    ) -> MaterializeStats {
        let mut graph = TargetGraph::with_extension(tmp.path(), &options.extension);
        let mut report = StitchReport::default();
        for target in targets {
            let is_remote = target.kind().is_remote();
            let address = graph.create_target(target).unwrap();
            if is_remote {
                report.remotes.push(address);
            } else {
                report.visited.push(address);
            }
        }
        Materializer::new(tmp.path(), options)
            .materialize(&graph, &report)
            .unwrap()
    }

    #[test]
    fn test_writes_missing_declaration() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/go/src/jane")).unwrap();
        let options = BuildgenOptions::default();

        let stats = run_materializer(
            &tmp,
            &options,
            vec![Target::new(
                Address::from_dir("src/go/src/jane"),
                TargetKind::Library,
            )],
        );
        assert_eq!(stats.files_written, 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("src/go/src/jane/BUILD")).unwrap(),
            "go_library()\n"
        );
    }

    #[test]
    fn test_skips_existing_identical_declaration() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("src/go/src/fred");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BUILD"), "go_binary()\n").unwrap();
        let options = BuildgenOptions::default();

        let stats = run_materializer(
            &tmp,
            &options,
            vec![Target::new(
                Address::from_dir("src/go/src/fred"),
                TargetKind::Binary,
            )],
        );
        assert_eq!(stats.files_written, 0);
    }

    #[test]
    fn test_appends_to_unrelated_content() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("3rdparty/go/pantsbuild.org/fake");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BUILD"), "go_remote_library(pkg = \"other\")\n").unwrap();
        let options = BuildgenOptions::default();

        run_materializer(
            &tmp,
            &options,
            vec![Target::new(
                Address::new("3rdparty/go/pantsbuild.org/fake", "prod"),
                TargetKind::RemoteLibrary {
                    pkg: "prod".to_string(),
                    rev: String::new(),
                },
            )],
        );

        let content = fs::read_to_string(dir.join("BUILD")).unwrap();
        assert_eq!(
            content,
            "go_remote_library(pkg = \"other\")\ngo_remote_library(pkg = \"prod\")\n"
        );
    }

    #[test]
    fn test_custom_extension_replaces_default_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("src/go/src/fred");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BUILD"), "go_binary()\n").unwrap();
        let mut options = BuildgenOptions::default();
        options.extension = ".gen".to_string();

        let stats = run_materializer(
            &tmp,
            &options,
            vec![Target::new(
                Address::from_dir("src/go/src/fred"),
                TargetKind::Binary,
            )],
        );

        assert_eq!(stats.files_removed, 1);
        assert_eq!(stats.files_written, 1);
        assert!(!dir.join("BUILD").exists());
        assert_eq!(
            fs::read_to_string(dir.join("BUILD.gen")).unwrap(),
            "go_binary()\n"
        );
    }

    #[test]
    fn test_custom_extension_keeps_default_file_with_unrelated_content() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("src/go/src/fred");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("BUILD"), "go_binary()\nresources(name = \"res\")\n").unwrap();
        let mut options = BuildgenOptions::default();
        options.extension = ".gen".to_string();

        run_materializer(
            &tmp,
            &options,
            vec![Target::new(
                Address::from_dir("src/go/src/fred"),
                TargetKind::Binary,
            )],
        );

        assert!(dir.join("BUILD").exists(), "unrelated content preserved");
        assert!(dir.join("BUILD.gen").exists());
    }
}
