//! # tgbuild - tglang build orchestrator
//!
//! tgbuild drives the multi-step native build of the tglang language
//! detector: the `libtglang.so` shared library, the two CMake tester
//! harnesses linked against it, the runnable bundle under `build/bin/`, an
//! optional tester run, and the `submission.zip` package.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build the runnable bundle (library + testers + resources)
//! tgbuild
//!
//! # Run a test file through the bundled tester
//! tgbuild -t samples/example.py
//!
//! # Package a release submission
//! tgbuild --target create-submission
//! ```
//!
//! ## Module Organization
//!
//! - [`registry`] - Static target table (ids, dependencies, actions)
//! - [`scheduler`] - Dependency resolution and ordered execution
//! - [`context`] - Per-run configuration shared by all actions
//! - [`actions`] - CMake, symlink, bundle and tester side effects
//! - [`submission`] - Filtered, path-rewritten zip packaging

/// Target actions (CMake builds, symlinking, bundling, running).
pub mod actions;

/// Run configuration and project layout constants.
pub mod context;

/// Static target table.
pub mod registry;

/// Dependency resolution and target execution.
pub mod scheduler;

/// Submission archive assembly.
pub mod submission;
