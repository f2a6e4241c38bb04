//! Configuration file support.
//!
//! Buildgen reads an optional project-level `gostitch.toml` at the build
//! root. CLI flags override file values. Example:
//!
//! ```toml
//! [buildgen]
//! remote = true
//! materialize = true
//! extension = ".gen"
//! fail_floating = true
//!
//! [roots]
//! local_suffixes = ["go/src"]
//! remote_suffixes = ["3rdparty/go"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::decl;

/// The project configuration file name.
pub const CONFIG_FILENAME: &str = "gostitch.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation behavior.
    pub buildgen: BuildgenOptions,

    /// Workspace root conventions.
    pub roots: RootsConfig,
}

/// Behavior switches for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildgenOptions {
    /// Resolve non-local imports against the remote root. When disabled, any
    /// new remote import encountered is an error.
    pub remote: bool,

    /// Write synthesized declarations to disk instead of keeping the
    /// stitched graph in memory only.
    pub materialize: bool,

    /// Extension appended to the declaration file name (e.g. `.gen` writes
    /// `BUILD.gen`). Empty uses the default name.
    pub extension: String,

    /// Fail the run when any synthesized remote library has no pinned
    /// revision.
    pub fail_floating: bool,
}

impl Default for BuildgenOptions {
    fn default() -> Self {
        BuildgenOptions {
            remote: true,
            materialize: false,
            extension: String::new(),
            fail_floating: false,
        }
    }
}

impl BuildgenOptions {
    /// The declaration file name this run writes (`BUILD` or `BUILD<ext>`).
    pub fn decl_filename(&self) -> String {
        format!("{}{}", decl::DEFAULT_FILENAME, self.extension)
    }

    /// Whether a non-default declaration file name is configured.
    pub fn has_custom_extension(&self) -> bool {
        !self.extension.is_empty()
    }
}

/// Structural conventions for recognizing workspace roots.
///
/// A directory qualifies as a root when its build-root-relative path ends
/// with one of the configured component suffixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    /// Suffixes marking the local (first-party) source root, GOPATH-style.
    pub local_suffixes: Vec<String>,

    /// Suffixes marking the remote (vendored third-party) root.
    pub remote_suffixes: Vec<String>,
}

impl Default for RootsConfig {
    fn default() -> Self {
        RootsConfig {
            local_suffixes: vec!["go/src".to_string()],
            remote_suffixes: vec!["3rdparty/go".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load the project config under `build_root`, falling back to defaults
    /// when the file does not exist.
    pub fn load_or_default(build_root: &Path) -> Self {
        let path = build_root.join(CONFIG_FILENAME);
        if path.exists() {
            Self::load(&path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}
