//! Static target table.
//!
//! Every build step is a [`Target`]: an identifier, an ordered dependency
//! list and the [`Action`] it performs. The table is constructed once at
//! startup and only consulted after that; there is no global mutable state.

use clap::ValueEnum;
use std::fmt;

use crate::context::{LIB_DIR, MULTITESTER_DIR, TESTER_DIR};

/// Closed set of build-step identifiers, as accepted by `--target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum TargetId {
    /// Build the shared library `libtglang.so`.
    Lib,
    /// Build the single-file tester harness.
    Tester,
    /// Build the batch tester harness.
    Multitester,
    /// Symlink the built library next to the tester sources.
    LinkTester,
    /// Symlink the built library next to the multitester sources.
    LinkMultitester,
    /// Assemble the runnable bundle under `build/bin`.
    Binary,
    /// Run the bundled tester against `--test-file`.
    TestFile,
    /// Package `submission.zip`.
    CreateSubmission,
}

impl TargetId {
    pub fn name(self) -> &'static str {
        match self {
            TargetId::Lib => "lib",
            TargetId::Tester => "tester",
            TargetId::Multitester => "multitester",
            TargetId::LinkTester => "link-tester",
            TargetId::LinkMultitester => "link-multitester",
            TargetId::Binary => "binary",
            TargetId::TestFile => "test-file",
            TargetId::CreateSubmission => "create-submission",
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Side effect bound to a target.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Configure and build the CMake project in `src/<dir>`.
    Build { dir: &'static str },
    /// Replace the `libtglang.so` symlink inside a consumer's source tree.
    LinkLibrary { consumer: &'static str },
    /// Copy binaries, runner script and resources into the bundle.
    CopyBinaries,
    /// Execute the bundled tester on the test file.
    RunTester,
    /// Assemble the submission archive.
    CreateSubmission,
}

/// One named build step. Dependencies execute before the target itself,
/// in declared order.
pub struct Target {
    pub id: TargetId,
    pub deps: &'static [TargetId],
    pub action: Action,
}

/// The target table for one run. Owned by the caller, borrowed by the
/// scheduler.
pub struct Registry {
    targets: Vec<Target>,
}

impl Registry {
    pub fn new(targets: Vec<Target>) -> Self {
        Registry { targets }
    }

    /// The full tglang pipeline.
    pub fn builtin() -> Self {
        Registry::new(vec![
            Target {
                id: TargetId::Lib,
                deps: &[],
                action: Action::Build { dir: LIB_DIR },
            },
            Target {
                id: TargetId::LinkTester,
                deps: &[TargetId::Lib],
                action: Action::LinkLibrary {
                    consumer: TESTER_DIR,
                },
            },
            Target {
                id: TargetId::LinkMultitester,
                deps: &[TargetId::Lib],
                action: Action::LinkLibrary {
                    consumer: MULTITESTER_DIR,
                },
            },
            Target {
                id: TargetId::Tester,
                deps: &[TargetId::LinkTester],
                action: Action::Build { dir: TESTER_DIR },
            },
            Target {
                id: TargetId::Multitester,
                deps: &[TargetId::LinkMultitester],
                action: Action::Build {
                    dir: MULTITESTER_DIR,
                },
            },
            Target {
                id: TargetId::Binary,
                deps: &[TargetId::Tester, TargetId::Multitester, TargetId::Lib],
                action: Action::CopyBinaries,
            },
            Target {
                id: TargetId::TestFile,
                deps: &[TargetId::Binary],
                action: Action::RunTester,
            },
            Target {
                id: TargetId::CreateSubmission,
                deps: &[TargetId::Binary],
                action: Action::CreateSubmission,
            },
        ])
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TARGETS: [TargetId; 8] = [
        TargetId::Lib,
        TargetId::Tester,
        TargetId::Multitester,
        TargetId::LinkTester,
        TargetId::LinkMultitester,
        TargetId::Binary,
        TargetId::TestFile,
        TargetId::CreateSubmission,
    ];

    #[test]
    fn builtin_registry_covers_every_target_id() {
        let registry = Registry::builtin();
        for id in ALL_TARGETS {
            assert!(registry.get(id).is_some(), "missing target `{id}`");
        }
    }

    #[test]
    fn dependencies_reference_registered_targets() {
        let registry = Registry::builtin();
        for target in registry.targets() {
            for dep in target.deps {
                assert!(
                    registry.get(*dep).is_some(),
                    "target `{}` depends on unregistered `{dep}`",
                    target.id
                );
            }
        }
    }
}
