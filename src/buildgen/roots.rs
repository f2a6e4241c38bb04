//! Workspace root location.
//!
//! A workspace has at most one local source root (the GOPATH-style `src`
//! directory all first-party packages live under) and at most one remote
//! root (the directory third-party declarations live under). Both are
//! recognized structurally: a directory qualifies when its
//! build-root-relative path ends with a configured component suffix.
//!
//! Location runs once, up front, so ambiguity is reported before any part of
//! the graph is touched.

use std::path::Path;

use anyhow::Context;
use tracing::debug;
use walkdir::WalkDir;

use crate::buildgen::errors::BuildgenError;
use crate::util::config::RootsConfig;
use crate::util::fs as ufs;

/// The validated root pair for a run.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceRoots {
    /// Build-root-relative local source root, if one exists.
    pub local: Option<String>,

    /// Build-root-relative remote root, if one exists.
    pub remote: Option<String>,
}

/// Scan the workspace for root-shaped directories and validate uniqueness.
pub fn locate(build_root: &Path, config: &RootsConfig) -> Result<WorkspaceRoots, BuildgenError> {
    let mut local = Vec::new();
    let mut remote = Vec::new();

    let walker = WalkDir::new(build_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry
            .with_context(|| format!("failed to scan workspace: {}", build_root.display()))?;
        if !entry.file_type().is_dir() || entry.depth() == 0 {
            continue;
        }
        let Some(rel) = ufs::relative_str(build_root, entry.path()) else {
            continue;
        };
        if matches_any_suffix(&rel, &config.local_suffixes) {
            debug!(root = %rel, "local source root candidate");
            local.push(rel);
        } else if matches_any_suffix(&rel, &config.remote_suffixes) {
            debug!(root = %rel, "remote root candidate");
            remote.push(rel);
        }
    }

    if local.len() > 1 {
        return Err(BuildgenError::InvalidLocalRoots(local));
    }
    if remote.len() > 1 {
        return Err(BuildgenError::InvalidRemoteRoots(remote));
    }

    Ok(WorkspaceRoots {
        local: local.pop(),
        remote: remote.pop(),
    })
}

/// Whether `rel` is under the directory `root` (or is `root` itself).
pub fn is_under(rel: &str, root: &str) -> bool {
    rel == root || rel.starts_with(&format!("{}/", root))
}

fn matches_any_suffix(rel: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| {
        let rel_parts: Vec<&str> = rel.split('/').collect();
        let suffix_parts: Vec<&str> = suffix.split('/').collect();
        rel_parts.len() >= suffix_parts.len() && rel_parts.ends_with(&suffix_parts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn locate_in(dirs: &[&str]) -> Result<WorkspaceRoots, BuildgenError> {
        let tmp = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        locate(tmp.path(), &RootsConfig::default())
    }

    #[test]
    fn test_empty_workspace_has_no_roots() {
        let roots = locate_in(&[]).unwrap();
        assert_eq!(roots.local, None);
        assert_eq!(roots.remote, None);
    }

    #[test]
    fn test_single_roots_located() {
        let roots = locate_in(&["src/go/src/fred", "3rdparty/go"]).unwrap();
        assert_eq!(roots.local.as_deref(), Some("src/go/src"));
        assert_eq!(roots.remote.as_deref(), Some("3rdparty/go"));
    }

    #[test]
    fn test_multiple_local_roots_rejected() {
        let err = locate_in(&["src/go/src", "src/main/go/src"]).unwrap_err();
        assert!(matches!(err, BuildgenError::InvalidLocalRoots(roots) if roots.len() == 2));
    }

    #[test]
    fn test_multiple_remote_roots_rejected() {
        let err = locate_in(&["src/go/src", "3rdparty/go", "other/3rdparty/go"]).unwrap_err();
        assert!(matches!(err, BuildgenError::InvalidRemoteRoots(roots) if roots.len() == 2));
    }

    #[test]
    fn test_package_dirs_are_not_roots() {
        // Packages below the root must not register as additional roots.
        let roots = locate_in(&["src/go/src/jane", "src/go/src/fred"]).unwrap();
        assert_eq!(roots.local.as_deref(), Some("src/go/src"));
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("src/go/src/fred", "src/go/src"));
        assert!(is_under("src/go/src", "src/go/src"));
        assert!(!is_under("src2/go/src/fred", "src/go/src"));
    }
}
