//! Target actions: the side effects behind each build step.
//!
//! Every action reads the run [`Context`] plus filesystem state and performs
//! one effect category: drive CMake for a subproject, replace the shared
//! library symlink next to a consumer, stage the runnable bundle, run the
//! tester, or package the submission. A failed action reports a descriptive
//! error and aborts the run; nothing is rolled back.

use anyhow::{Context as _, Result, bail};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::{
    Context, FASTTEXT_MODEL, LIB_BINARY, LIB_DIR, MULTITESTER_BINARY, MULTITESTER_DIR,
    RESOURCES_DIR, RUNNER_SCRIPT, TESTER_BINARY, TESTER_DIR,
};
use crate::registry::{Action, Target};
use crate::submission;

/// Dispatch a target's action.
pub fn run(target: &Target, ctx: &Context) -> Result<()> {
    match target.action {
        Action::Build { dir } => build_cmake(dir, ctx),
        Action::LinkLibrary { consumer } => link_library(consumer, ctx),
        Action::CopyBinaries => copy_binaries(ctx),
        Action::RunTester => run_tester(ctx),
        Action::CreateSubmission => submission::create_submission(ctx),
    }
}

/// Configure and build one CMake subproject: sources in `src/<dir>`, output
/// in `<build_root>/<dir>`. Both directories are created if absent.
pub fn build_cmake(dir: &str, ctx: &Context) -> Result<()> {
    let source_dir = ctx.source_subdir(dir);
    let build_dir = ctx.build_subdir(dir);
    for d in [&source_dir, &build_dir] {
        if !d.exists() {
            fs::create_dir_all(d)
                .with_context(|| format!("Failed to create directory `{}`", d.display()))?;
        }
    }

    let status = Command::new("cmake")
        .arg(format!("-DCMAKE_BUILD_TYPE={}", ctx.build_mode.cmake_name()))
        .arg("-S")
        .arg(&source_dir)
        .arg("-B")
        .arg(&build_dir)
        .status()
        .context("Failed to execute cmake - is it installed and on PATH?")?;
    if !status.success() {
        bail!("CMake configure failed for `{}` ({status})", dir);
    }

    let status = Command::new("cmake")
        .arg("--build")
        .arg(&build_dir)
        .arg("--parallel")
        .status()
        .context("Failed to execute cmake")?;
    if !status.success() {
        bail!("CMake build failed for `{}` ({status})", dir);
    }
    Ok(())
}

/// Replace the `libtglang.so` symlink inside `src/<consumer>` so the harness
/// links against the freshly built library. Delete-then-create leaves a
/// narrow gap; a single orchestrator invocation owns the tree, so that gap
/// is accepted.
pub fn link_library(consumer: &str, ctx: &Context) -> Result<()> {
    let src = ctx.build_subdir(LIB_DIR).join(LIB_BINARY);
    let dst = ctx.source_subdir(consumer).join(LIB_BINARY);

    // symlink_metadata also sees dangling symlinks, which exists() misses.
    if dst.symlink_metadata().is_ok() {
        fs::remove_file(&dst)
            .with_context(|| format!("Failed to remove old symlink `{}`", dst.display()))?;
    }
    make_symlink(&src, &dst)
        .with_context(|| format!("Failed to symlink `{}` -> `{}`", dst.display(), src.display()))
}

#[cfg(unix)]
fn make_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn make_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Stage the runnable bundle: binaries, library and runner script flat in
/// `bin/`, the fastText model under `bin/resources/`. Validates the whole
/// input list before touching the bundle directory, then rebuilds it from
/// scratch.
pub fn copy_binaries(ctx: &Context) -> Result<()> {
    let binaries: Vec<(PathBuf, &str)> = vec![
        (ctx.build_subdir(TESTER_DIR).join(TESTER_BINARY), TESTER_BINARY),
        (
            ctx.build_subdir(MULTITESTER_DIR).join(MULTITESTER_BINARY),
            MULTITESTER_BINARY,
        ),
        (ctx.build_subdir(LIB_DIR).join(LIB_BINARY), LIB_BINARY),
        (ctx.source_root.join("scripts").join(RUNNER_SCRIPT), RUNNER_SCRIPT),
    ];
    let resources: Vec<(PathBuf, &str)> = vec![(
        ctx.source_subdir(RESOURCES_DIR).join(FASTTEXT_MODEL),
        FASTTEXT_MODEL,
    )];

    for (path, _) in binaries.iter().chain(resources.iter()) {
        if !path.exists() {
            bail!("Missing bundle input: `{}`", path.display());
        }
    }

    if ctx.bin_dir.exists() {
        fs::remove_dir_all(&ctx.bin_dir).context("Failed to remove old bundle directory")?;
    }
    fs::create_dir_all(&ctx.bin_dir).context("Failed to create bundle directory")?;

    for (path, name) in &binaries {
        fs::copy(path, ctx.bin_dir.join(name))
            .with_context(|| format!("Failed to copy `{}` into bundle", path.display()))?;
    }

    let resources_dir = ctx.bin_dir.join(RESOURCES_DIR);
    fs::create_dir_all(&resources_dir).context("Failed to create bundle resources directory")?;
    for (path, name) in &resources {
        fs::copy(path, resources_dir.join(name))
            .with_context(|| format!("Failed to copy `{}` into bundle", path.display()))?;
    }

    println!("{} Bundle staged at {}", "✓".green(), ctx.bin_dir.display());
    Ok(())
}

/// Run the bundled tester on the configured test file, with the dynamic
/// loader pointed at the bundle directory and the bundle directory as cwd.
pub fn run_tester(ctx: &Context) -> Result<()> {
    let binary = ctx.bin_dir.join(TESTER_BINARY);
    if !binary.exists() {
        bail!("Tester binary doesn't exist: `{}`", binary.display());
    }
    let test_file = ctx
        .test_file
        .as_ref()
        .context("No test file given - pass one with --test-file")?;

    let status = Command::new(&binary)
        .arg(test_file)
        .env("LD_LIBRARY_PATH", &ctx.bin_dir)
        .current_dir(&ctx.bin_dir)
        .status()
        .with_context(|| format!("Failed to execute `{}`", binary.display()))?;
    if !status.success() {
        bail!("Tester failed on `{}` ({status})", test_file.display());
    }
    Ok(())
}
