//! Dependency resolution and target execution.
//!
//! The scheduler turns a set of requested targets into an ordered plan:
//! depth-first over the registry's dependency edges, with a run-scoped
//! visited set so every reachable target appears at most once. Planning is
//! side-effect free; [`execute`] then runs the plan's actions in order and
//! aborts on the first failure, leaving completed side effects in place.

use anyhow::{Context as _, Result, bail};
use colored::*;
use std::collections::{HashMap, HashSet};

use crate::actions;
use crate::context::Context;
use crate::registry::{Registry, TargetId};

/// Plans one run. The visited set lives exactly as long as the scheduler;
/// once a target is inserted it never leaves.
pub struct Scheduler<'r> {
    registry: &'r Registry,
    visited: HashSet<TargetId>,
}

impl<'r> Scheduler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Scheduler {
            registry,
            visited: HashSet::new(),
        }
    }

    /// Compute the execution order for `requested`: every dependency before
    /// its dependent, every target at most once. Requested roots are
    /// traversed in the order given.
    pub fn plan(mut self, requested: &[TargetId]) -> Result<Vec<TargetId>> {
        let mut order = Vec::new();
        for id in requested {
            self.visit(*id, &mut order)?;
        }
        Ok(order)
    }

    fn visit(&mut self, id: TargetId, order: &mut Vec<TargetId>) -> Result<()> {
        if self.visited.contains(&id) {
            return Ok(());
        }
        self.visited.insert(id);

        let target = self
            .registry
            .get(id)
            .with_context(|| format!("target `{id}` is not registered"))?;
        for dep in target.deps {
            self.visit(*dep, order)?;
        }
        order.push(id);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

/// Reject cyclic dependency declarations before anything runs. A cycle in
/// the static table is a configuration error, not a runtime condition.
pub fn check_cycles(registry: &Registry) -> Result<()> {
    let mut marks = HashMap::new();
    for target in registry.targets() {
        dfs(registry, target.id, &mut marks)?;
    }
    Ok(())
}

fn dfs(registry: &Registry, id: TargetId, marks: &mut HashMap<TargetId, Mark>) -> Result<()> {
    match marks.get(&id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => bail!("dependency cycle involving target `{id}`"),
        None => {}
    }
    marks.insert(id, Mark::InProgress);

    let target = registry
        .get(id)
        .with_context(|| format!("target `{id}` is not registered"))?;
    for dep in target.deps {
        dfs(registry, *dep, marks)?;
    }

    marks.insert(id, Mark::Done);
    Ok(())
}

/// Validate the registry, plan the requested targets and run their actions
/// in order. The first failing action aborts the run; already-built
/// artifacts stay on disk.
pub fn execute(registry: &Registry, requested: &[TargetId], ctx: &Context) -> Result<()> {
    check_cycles(registry)?;

    let order = Scheduler::new(registry).plan(requested)?;
    let names: Vec<&str> = order.iter().map(|id| id.name()).collect();
    println!("{} Target execution order: {}", "▶".cyan(), names.join(", "));

    for id in &order {
        println!("{} Executing target `{}`", "▶".cyan(), id.to_string().bold());
        let target = registry
            .get(*id)
            .with_context(|| format!("target `{id}` is not registered"))?;
        actions::run(target, ctx)
            .with_context(|| format!("target `{id}` failed"))?;
    }
    Ok(())
}
