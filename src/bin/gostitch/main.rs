//! Gostitch CLI - BUILD file generation for Go source trees

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gostitch::core::Address;
use gostitch::util::Config;
use gostitch::Buildgen;

mod cli;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("gostitch=debug")
    } else {
        EnvFilter::new("gostitch=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let build_root = match cli.build_root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    // File config first, CLI flags on top.
    let mut config = Config::load_or_default(&build_root);
    if cli.materialize {
        config.buildgen.materialize = true;
    }
    if cli.no_remote {
        config.buildgen.remote = false;
    }
    if cli.fail_floating {
        config.buildgen.fail_floating = true;
    }
    if let Some(extension) = cli.extension {
        config.buildgen.extension = extension;
    }

    let entry_points = cli
        .targets
        .iter()
        .map(|spec| Address::parse(spec))
        .collect::<Result<Vec<_>>>()?;

    let buildgen = Buildgen::new(&build_root, config);
    let mut graph = buildgen.new_graph();
    let report = buildgen.execute(&mut graph, &entry_points)?;

    if report.is_noop() {
        println!("Build graph is up to date ({} targets visited).", report.visited.len());
    } else {
        println!(
            "Visited {} targets: {} synthesized, {} new edges, {} files written.",
            report.visited.len(),
            report.synthesized.len(),
            report.new_edges,
            report.files_written
        );
    }
    Ok(())
}
