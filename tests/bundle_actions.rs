//! Integration tests for the bundle-staging and symlink actions.
//!
//! These run against fake build trees under a tempdir; no CMake involved.

use std::fs;
use std::path::Path;

use tgbuild::actions;
use tgbuild::context::{BuildMode, Context};

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, contents).expect("Failed to write file");
}

/// Lay out a project where all three CMake targets have been built.
fn built_project(root: &Path) -> Context {
    let source_root = root.join("proj");
    let build_root = source_root.join("build");

    write_file(&build_root.join("tglang-tester/tglang-tester"), "tester");
    write_file(
        &build_root.join("tglang-multitester/tglang-multitester"),
        "multitester",
    );
    write_file(&build_root.join("libtglang/libtglang.so"), "shared-object");
    write_file(&source_root.join("scripts/run-tglang.py"), "#!runner");
    write_file(
        &source_root.join("src/resources/fasttext-model.bin"),
        "model",
    );

    Context::new(BuildMode::Debug, source_root, build_root, None)
}

#[test]
fn copy_binaries_stages_the_full_bundle() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());

    actions::copy_binaries(&ctx).expect("copy_binaries failed");

    for name in ["tglang-tester", "tglang-multitester", "libtglang.so", "run-tglang.py"] {
        assert!(ctx.bin_dir.join(name).is_file(), "missing `{name}` in bundle");
    }
    assert!(ctx.bin_dir.join("resources/fasttext-model.bin").is_file());
}

#[test]
fn copy_binaries_rebuilds_the_bundle_from_scratch() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());

    write_file(&ctx.bin_dir.join("stale-leftover"), "old");
    actions::copy_binaries(&ctx).expect("copy_binaries failed");

    assert!(!ctx.bin_dir.join("stale-leftover").exists());
    assert!(ctx.bin_dir.join("tglang-tester").is_file());
}

#[test]
fn copy_binaries_validates_before_touching_anything() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());

    let model = ctx.source_root.join("src/resources/fasttext-model.bin");
    fs::remove_file(&model).unwrap();
    write_file(&ctx.bin_dir.join("previous-bundle"), "keep");

    let err = actions::copy_binaries(&ctx).unwrap_err();
    assert!(
        err.to_string().contains(&model.display().to_string()),
        "error should name the missing path, got: {err}"
    );
    // Validation failed first, so the old bundle was left alone.
    assert!(ctx.bin_dir.join("previous-bundle").exists());
}

#[cfg(unix)]
#[test]
fn link_library_creates_the_symlink() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());
    fs::create_dir_all(ctx.source_root.join("src/tglang-tester")).unwrap();

    actions::link_library("tglang-tester", &ctx).expect("link_library failed");

    let dst = ctx.source_root.join("src/tglang-tester/libtglang.so");
    let target = fs::read_link(&dst).expect("not a symlink");
    assert_eq!(target, ctx.build_root.join("libtglang/libtglang.so"));
}

#[cfg(unix)]
#[test]
fn link_library_replaces_an_existing_destination() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());
    let dst = ctx.source_root.join("src/tglang-tester/libtglang.so");
    write_file(&dst, "a regular file, not a symlink");

    actions::link_library("tglang-tester", &ctx).expect("link_library failed");

    assert!(fs::read_link(&dst).is_ok());
}

#[cfg(unix)]
#[test]
fn link_library_replaces_a_dangling_symlink() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());
    let dir = ctx.source_root.join("src/tglang-tester");
    fs::create_dir_all(&dir).unwrap();
    std::os::unix::fs::symlink("/nowhere/libtglang.so", dir.join("libtglang.so")).unwrap();

    actions::link_library("tglang-tester", &ctx).expect("link_library failed");

    let target = fs::read_link(dir.join("libtglang.so")).unwrap();
    assert_eq!(target, ctx.build_root.join("libtglang/libtglang.so"));
}

#[test]
fn run_tester_requires_a_staged_binary() {
    let tmp = tempfile::tempdir().unwrap();
    let ctx = built_project(tmp.path());

    let err = actions::run_tester(&ctx).unwrap_err();
    assert!(err.to_string().contains("tglang-tester"));
}
