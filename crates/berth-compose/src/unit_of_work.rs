//! Unit-of-work scheduling.
//!
//! Given the dependency graph and a resolved target, computes every
//! container that must be considered, classifies it, and orders it.
//! Planning finishes (or fails) before anything is dispatched.

use std::collections::BTreeSet;

use berth_common::error::{BerthError, Result};

use crate::action::{Action, Command, Scope, Step};
use crate::graph::DependencyGraph;

/// Why a container is part of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Explicitly targeted; receives the full command.
    Targeted,
    /// Needed running by something in the unit of work.
    MustRun,
    /// Present only to validate existence and order.
    OrderingOnly,
}

/// The execution plan for one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWork {
    targeted: BTreeSet<String>,
    containers: BTreeSet<String>,
    order: Vec<String>,
    must_run: BTreeSet<String>,
}

impl UnitOfWork {
    /// Plans the work for `targeted` against `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::NoApplicableContainers`] when there is nothing
    /// to act on, and [`BerthError::UnresolvedDependencies`] when the
    /// closure contains a cycle or an undeclared container.
    pub fn new<S: AsRef<str>>(graph: &DependencyGraph, targeted: &[S]) -> Result<Self> {
        let targeted: BTreeSet<String> = targeted.iter().map(|n| n.as_ref().to_string()).collect();
        let mut containers = targeted.clone();
        let mut must_run = BTreeSet::new();

        loop {
            let mut discovered = Vec::new();
            for name in &containers {
                let Some(deps) = graph.get(name) else {
                    continue;
                };
                for dep in deps.all() {
                    if deps.must_run(dep) {
                        let _ = must_run.insert(dep.clone());
                    }
                    if !containers.contains(dep) {
                        discovered.push(dep.clone());
                    }
                }
            }
            if discovered.is_empty() {
                break;
            }
            containers.extend(discovered);
        }
        must_run.retain(|name| !targeted.contains(name));

        if containers.is_empty() {
            return Err(BerthError::NoApplicableContainers);
        }

        let closure: Vec<&str> = containers.iter().map(String::as_str).collect();
        let order = graph.order(&closure, false)?;

        tracing::info!(?order, ?must_run, "planned unit of work");
        Ok(Self {
            targeted,
            containers,
            order,
            must_run,
        })
    }

    /// Every container in the closure, in dependency order.
    pub fn containers(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// The targeted containers only, in dependency order.
    pub fn targeted(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.targeted.contains(*name))
            .map(String::as_str)
            .collect()
    }

    /// The computed dependency order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Untargeted containers that have to end up running.
    pub fn must_run(&self) -> &BTreeSet<String> {
        &self.must_run
    }

    /// Classifies `name`, or `None` if it is not part of this unit of work.
    pub fn role(&self, name: &str) -> Option<Role> {
        if self.targeted.contains(name) {
            Some(Role::Targeted)
        } else if self.must_run.contains(name) {
            Some(Role::MustRun)
        } else if self.containers.contains(name) {
            Some(Role::OrderingOnly)
        } else {
            None
        }
    }

    /// The steps `command` performs, in dispatch order.
    ///
    /// Ordering-only containers never produce a step.
    pub fn plan(&self, command: Command) -> Vec<Step> {
        let scope = command.scope();
        let names = match scope {
            Scope::WithPrerequisites => self.containers(),
            Scope::TargetedOnly => self.targeted(),
        };

        let mut steps: Vec<Step> = names
            .into_iter()
            .filter_map(|name| match (self.role(name)?, scope) {
                (Role::Targeted, _) => Some(Step::new(name, Action::Apply(command))),
                (Role::MustRun, Scope::WithPrerequisites) => Some(Step::new(name, Action::EnsureStarted)),
                _ => None,
            })
            .collect();

        if command.is_reversed() {
            steps.reverse();
        }
        steps
    }
}
