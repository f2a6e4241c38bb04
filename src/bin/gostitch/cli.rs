//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Gostitch - generate BUILD files for a Go source tree
#[derive(Parser)]
#[command(name = "gostitch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Workspace build root (defaults to the current directory)
    #[arg(long, env = "GOSTITCH_BUILD_ROOT")]
    pub build_root: Option<PathBuf>,

    /// Write synthesized declarations to disk instead of a dry run
    #[arg(long)]
    pub materialize: bool,

    /// Disable remote import resolution
    #[arg(long)]
    pub no_remote: bool,

    /// Fail when a synthesized remote library has no pinned revision
    #[arg(long)]
    pub fail_floating: bool,

    /// Declaration file extension override (e.g. `.gen` writes BUILD.gen)
    #[arg(long)]
    pub extension: Option<String>,

    /// Entry-point target addresses; scans the whole local root when empty
    pub targets: Vec<String>,
}
