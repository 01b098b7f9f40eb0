//! Run configuration shared by every action.
//!
//! A [`Context`] is built once from CLI input and handed read-only to each
//! target's action. It pins the build mode, the source and build roots and
//! the derived bundle directory (`<build>/bin`).

use clap::ValueEnum;
use std::path::PathBuf;

/// Per-target source/build subdirectory names.
pub const LIB_DIR: &str = "libtglang";
pub const TESTER_DIR: &str = "tglang-tester";
pub const MULTITESTER_DIR: &str = "tglang-multitester";

/// Artifact names produced by the build targets.
pub const LIB_BINARY: &str = "libtglang.so";
pub const TESTER_BINARY: &str = "tglang-tester";
pub const MULTITESTER_BINARY: &str = "tglang-multitester";
pub const RUNNER_SCRIPT: &str = "run-tglang.py";

pub const FASTTEXT_MODEL: &str = "fasttext-model.bin";
pub const DEP_PACKAGES: &str = "deb-packages.txt";

pub const BIN_DIR: &str = "bin";
pub const RESOURCES_DIR: &str = "resources";
pub const SUBMISSION_ARCHIVE: &str = "submission.zip";

/// CMake build type. `create-submission` forces `Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BuildMode {
    #[value(name = "Debug")]
    Debug,
    #[value(name = "RelWithDebInfo")]
    RelWithDebInfo,
    #[value(name = "Release")]
    Release,
}

impl BuildMode {
    /// Value passed as `-DCMAKE_BUILD_TYPE=`.
    pub fn cmake_name(self) -> &'static str {
        match self {
            BuildMode::Debug => "Debug",
            BuildMode::RelWithDebInfo => "RelWithDebInfo",
            BuildMode::Release => "Release",
        }
    }
}

/// Immutable run configuration. `bin_dir` is always `build_root/bin`.
#[derive(Debug, Clone)]
pub struct Context {
    pub build_mode: BuildMode,
    pub source_root: PathBuf,
    pub build_root: PathBuf,
    pub bin_dir: PathBuf,
    pub test_file: Option<PathBuf>,
}

impl Context {
    pub fn new(
        build_mode: BuildMode,
        source_root: PathBuf,
        build_root: PathBuf,
        test_file: Option<PathBuf>,
    ) -> Self {
        let bin_dir = build_root.join(BIN_DIR);
        Context {
            build_mode,
            source_root,
            build_root,
            bin_dir,
            test_file,
        }
    }

    /// `<source_root>/src/<name>` - where a target's sources live.
    pub fn source_subdir(&self, name: &str) -> PathBuf {
        self.source_root.join("src").join(name)
    }

    /// `<build_root>/<name>` - where a target's build output lands.
    pub fn build_subdir(&self, name: &str) -> PathBuf {
        self.build_root.join(name)
    }
}
