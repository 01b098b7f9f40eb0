//! # tgbuild CLI Entry Point
//!
//! Parses CLI arguments with clap, builds the run context and hands the
//! requested targets to the scheduler. Performs shared library build, links
//! it with the tester harnesses, assembles the runnable bundle and packages
//! submissions.

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::*;
use std::fs;
use std::path::PathBuf;

use tgbuild::context::{BuildMode, Context};
use tgbuild::registry::{Registry, TargetId};
use tgbuild::scheduler;

#[derive(Parser)]
#[command(name = "tgbuild")]
#[command(about = "Build orchestrator for the tglang language detector", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Targets to build
    #[arg(long = "target", value_enum, num_args = 1.., default_values_t = [TargetId::Binary])]
    target: Vec<TargetId>,

    /// Remove the build directory first, rebuilding the project from scratch
    #[arg(long)]
    clean: bool,

    /// Build type passed to CMake
    #[arg(short = 'b', long, value_enum, default_value_t = BuildMode::Debug)]
    build_type: BuildMode,

    /// Project source directory
    #[arg(short = 'S', long)]
    source_dir: Option<PathBuf>,

    /// Build directory, stores CMake output and build artifacts
    #[arg(short = 'B', long)]
    build_dir: Option<PathBuf>,

    /// Test file to run through the bundled tester (implies the test-file target)
    #[arg(short = 't', long)]
    test_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let source_root = match cli.source_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let build_root = cli
        .build_dir
        .unwrap_or_else(|| source_root.join("build"));

    if cli.clean && build_root.exists() {
        println!(
            "{} Removing build directory {}",
            "🗑️".red(),
            build_root.display()
        );
        fs::remove_dir_all(&build_root).context("Failed to remove build directory")?;
    }

    let mut targets = cli.target;
    let mut build_mode = cli.build_type;

    if targets.contains(&TargetId::CreateSubmission) {
        println!(
            "{} Forcing build type to `Release`, creating submission",
            "!".yellow()
        );
        build_mode = BuildMode::Release;
    }

    // The tester runs with the bundle directory as cwd, so resolve the test
    // file before changing anything on disk.
    let test_file = cli
        .test_file
        .map(|path| {
            path.canonicalize()
                .with_context(|| format!("Test file not found: `{}`", path.display()))
        })
        .transpose()?;
    if test_file.is_some() && !targets.contains(&TargetId::TestFile) {
        targets.push(TargetId::TestFile);
    }

    let ctx = Context::new(build_mode, source_root, build_root, test_file);
    let registry = Registry::builtin();
    scheduler::execute(&registry, &targets, &ctx)
}
