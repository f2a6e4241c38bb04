//! Import path classification.
//!
//! Every import referenced by scanned sources is either ignorable (standard
//! library and pseudo-imports), local (resolvable inside the local source
//! root), or remote (resolvable against the fetcher namespace).

use std::path::PathBuf;

use thiserror::Error;

use crate::buildgen::errors::GenerationCause;
use crate::fetcher::FetcherFactory;
use crate::imports::has_go_sources;

/// The cgo pseudo-import. It marks an inline C block, not a package, and
/// must never produce an edge or a target.
const CGO_IMPORT: &str = "C";

/// The classification of one raw import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClass {
    /// Standard library or pseudo-import: no edge, no target.
    Ignore,

    /// A package under the local source root; the path is relative to it.
    Local(String),

    /// A remote library import.
    Remote {
        /// The canonical install root the import collapses onto.
        root: String,

        /// The sub-package remainder below the install root; empty when the
        /// install root itself is imported.
        pkg: String,
    },
}

/// Classification failure.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Cause(GenerationCause),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Classifies import paths against a located root pair.
pub struct Classifier<'a> {
    local_root: PathBuf,
    remote_enabled: bool,
    fetchers: &'a dyn FetcherFactory,
}

impl<'a> Classifier<'a> {
    /// Create a classifier for the absolute local root directory.
    pub fn new(local_root: PathBuf, remote_enabled: bool, fetchers: &'a dyn FetcherFactory) -> Self {
        Classifier {
            local_root,
            remote_enabled,
            fetchers,
        }
    }

    /// Classify a single raw import path.
    pub fn classify(&self, import_path: &str) -> Result<ImportClass, ClassifyError> {
        if import_path == CGO_IMPORT {
            return Ok(ImportClass::Ignore);
        }

        if has_go_sources(&self.local_root.join(import_path)) {
            return Ok(ImportClass::Local(import_path.to_string()));
        }

        // Standard library packages have undotted leading segments (`fmt`,
        // `net/http`); remote imports lead with a host name.
        let first_segment = import_path.split('/').next().unwrap_or(import_path);
        if !first_segment.contains('.') {
            return Ok(ImportClass::Ignore);
        }

        if !self.remote_enabled {
            return Err(ClassifyError::Cause(GenerationCause::RemoteNotAllowed {
                import: import_path.to_string(),
            }));
        }

        let root = self
            .fetchers
            .get_fetcher(import_path)
            .and_then(|f| f.root())?;
        let pkg = import_path
            .strip_prefix(&root)
            .unwrap_or("")
            .trim_start_matches('/')
            .to_string();
        Ok(ImportClass::Remote { root, pkg })
    }
}
