//! Submission archive assembly.
//!
//! Packages the built library, the dependency manifest, a filtered copy of
//! the library sources (under `src/` in the archive) and the staged
//! resources (under `resources/`) into `bin/submission.zip`. Required
//! artifacts are validated before the archive is even opened for write; for
//! a fixed filesystem snapshot the produced entry set is deterministic.

use anyhow::{Context as _, Result, bail};
use colored::*;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;

use crate::context::{
    Context, DEP_PACKAGES, LIB_BINARY, LIB_DIR, MULTITESTER_BINARY, RESOURCES_DIR, RUNNER_SCRIPT,
    SUBMISSION_ARCHIVE, TESTER_BINARY,
};

/// One file headed for the archive: where it is on disk and where it lands
/// inside the zip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub dest: String,
}

/// Build and write `submission.zip` into the bundle directory.
pub fn create_submission(ctx: &Context) -> Result<()> {
    let entries = collect_entries(ctx)?;
    let out_path = ctx.bin_dir.join(SUBMISSION_ARCHIVE);
    write_archive(&entries, &out_path)?;
    println!(
        "{} Submission ready: {} ({} entries)",
        "✓".green(),
        out_path.display(),
        entries.len()
    );
    Ok(())
}

/// Enumerate everything that goes into the archive. Fails before producing
/// any entry if a required artifact is missing.
pub fn collect_entries(ctx: &Context) -> Result<Vec<ArchiveEntry>> {
    let lib = ctx.bin_dir.join(LIB_BINARY);
    let manifest = ctx.source_root.join("src").join(DEP_PACKAGES);
    let required = [
        ctx.bin_dir.join(TESTER_BINARY),
        ctx.bin_dir.join(MULTITESTER_BINARY),
        ctx.bin_dir.join(RUNNER_SCRIPT),
        lib.clone(),
        manifest.clone(),
    ];
    for path in &required {
        if !path.exists() {
            bail!("Missing submission artifact: `{}`", path.display());
        }
    }

    let mut entries = vec![
        ArchiveEntry {
            source: lib,
            dest: LIB_BINARY.to_string(),
        },
        ArchiveEntry {
            source: manifest,
            dest: DEP_PACKAGES.to_string(),
        },
    ];

    // Library sources, minus generated build state and the embedded model
    // blob header.
    let lib_src = ctx.source_subdir(LIB_DIR);
    let ignored = [lib_src.join("build"), lib_src.join("fasttext_model_blob.h")];
    collect_subtree(&lib_src, "src", &ignored, &mut entries)?;

    // Resources already staged into the bundle.
    let staged_resources = ctx.bin_dir.join(RESOURCES_DIR);
    collect_subtree(&staged_resources, RESOURCES_DIR, &[], &mut entries)?;

    Ok(entries)
}

/// Walk `root` and append an entry per regular file, rewriting each path to
/// `<prefix>/<path relative to root>`. Directories never become entries;
/// anything under an ignored prefix is skipped entirely.
fn collect_subtree(
    root: &Path,
    prefix: &str,
    ignored: &[PathBuf],
    entries: &mut Vec<ArchiveEntry>,
) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk `{}`", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if ignored.iter().any(|ig| path.starts_with(ig)) {
            continue;
        }
        entries.push(ArchiveEntry {
            source: path.to_path_buf(),
            dest: rewrite_dest(path, root, prefix)?,
        });
    }
    Ok(())
}

/// Strip `root` from `path` and re-root the remainder under `prefix`, with
/// forward slashes as the zip standard requires. The result never starts
/// with a separator.
fn rewrite_dest(path: &Path, root: &Path, prefix: &str) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("`{}` is outside of `{}`", path.display(), root.display()))?;
    let mut dest = String::from(prefix);
    for component in rel.components() {
        dest.push('/');
        dest.push_str(&component.as_os_str().to_string_lossy());
    }
    Ok(dest)
}

/// Stream every entry into a single zip at `out_path`. Entries are written
/// in the order given; the archive is only opened once validation upstream
/// has passed.
pub fn write_archive(entries: &[ArchiveEntry], out_path: &Path) -> Result<()> {
    let file = File::create(out_path)
        .with_context(|| format!("Failed to create archive `{}`", out_path.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o755);

    for entry in entries {
        zip.start_file(&entry.dest, options)?;
        let mut src = File::open(&entry.source)
            .with_context(|| format!("Failed to open `{}`", entry.source.display()))?;
        io::copy(&mut src, &mut zip)
            .with_context(|| format!("Failed to archive `{}`", entry.source.display()))?;
    }

    zip.finish().context("Failed to finalize archive")?;
    Ok(())
}
