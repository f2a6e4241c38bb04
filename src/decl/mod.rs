//! BUILD declaration files.
//!
//! Declarations are line-oriented: one target per line, in the form
//! `go_binary()`, `go_library()`, or `go_remote_library(pkg = "sub", rev =
//! "v1.2.3")` (both attributes optional). A file may hold several
//! declarations. Anything that is not a blank line, a `#` comment, or a
//! recognized declaration is treated as unrelated content that buildgen must
//! never truncate.

use regex::Regex;

use crate::core::address::{basename, Address};
use crate::core::target::{Target, TargetKind};

/// The default declaration file name; a configured extension is appended to
/// this (`BUILD.gen` for extension `.gen`).
pub const DEFAULT_FILENAME: &str = "BUILD";

/// A single parsed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Binary,
    Library,
    RemoteLibrary { pkg: String, rev: String },
}

impl Declaration {
    /// Render the declaration as a single line, without a trailing newline.
    pub fn render(&self) -> String {
        match self {
            Declaration::Binary => "go_binary()".to_string(),
            Declaration::Library => "go_library()".to_string(),
            Declaration::RemoteLibrary { pkg, rev } => {
                let mut attrs = Vec::new();
                if !pkg.is_empty() {
                    attrs.push(format!("pkg = \"{}\"", pkg));
                }
                if !rev.is_empty() {
                    attrs.push(format!("rev = \"{}\"", rev));
                }
                format!("go_remote_library({})", attrs.join(", "))
            }
        }
    }

    /// The declaration describing an existing target.
    pub fn for_target(target: &Target) -> Declaration {
        match target.kind() {
            TargetKind::Binary => Declaration::Binary,
            TargetKind::Library => Declaration::Library,
            TargetKind::RemoteLibrary { pkg, rev } => Declaration::RemoteLibrary {
                pkg: pkg.clone(),
                rev: rev.clone(),
            },
        }
    }

    /// Reconstruct the target this declaration describes, given the
    /// build-root-relative directory of its declaration file.
    ///
    /// Local targets are named after the directory. Remote targets are named
    /// after their `pkg` attribute when present, so distinct sub-packages of
    /// one install root can share a declaration file.
    pub fn into_target(self, dir: &str) -> Target {
        match self {
            Declaration::Binary => Target::new(Address::from_dir(dir), TargetKind::Binary),
            Declaration::Library => Target::new(Address::from_dir(dir), TargetKind::Library),
            Declaration::RemoteLibrary { pkg, rev } => {
                let name = if pkg.is_empty() {
                    basename(dir).to_string()
                } else {
                    pkg.clone()
                };
                Target::new(
                    Address::new(dir, name),
                    TargetKind::RemoteLibrary { pkg, rev },
                )
            }
        }
    }
}

/// The parsed view of a declaration file.
#[derive(Debug, Clone, Default)]
pub struct DeclFile {
    /// Recognized declarations, in file order.
    pub declarations: Vec<Declaration>,

    /// Whether the file holds content buildgen does not understand and must
    /// preserve.
    pub has_unrelated: bool,
}

/// Parse declaration file content.
pub fn parse(content: &str) -> DeclFile {
    let decl_re =
        Regex::new(r#"^\s*(go_binary|go_library|go_remote_library)\s*\(([^)]*)\)\s*(?:#.*)?$"#)
            .unwrap();
    let attr_re = Regex::new(r#"(\w+)\s*=\s*['"]([^'"]*)['"]"#).unwrap();

    let mut file = DeclFile::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(caps) = decl_re.captures(line) else {
            file.has_unrelated = true;
            continue;
        };
        let args = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let decl = match &caps[1] {
            "go_binary" => Declaration::Binary,
            "go_library" => Declaration::Library,
            _ => {
                let mut pkg = String::new();
                let mut rev = String::new();
                for attr in attr_re.captures_iter(args) {
                    match &attr[1] {
                        "pkg" => pkg = attr[2].to_string(),
                        "rev" => rev = attr[2].to_string(),
                        _ => {}
                    }
                }
                Declaration::RemoteLibrary { pkg, rev }
            }
        };
        file.declarations.push(decl);
    }
    file
}
