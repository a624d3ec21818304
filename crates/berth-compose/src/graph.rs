//! Dependency graph over all declared containers.
//!
//! Maps every container name to its [`Dependencies`] and computes
//! topological orderings over subsets of it. Ordering never mutates the
//! graph, so one instance can serve several scheduling calls.

use std::collections::{BTreeMap, BTreeSet};

use berth_common::error::{BerthError, Result};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::config::ComposeConfig;
use crate::dependencies::{Dependencies, DependencyKind, Selector};

/// Container name to dependencies, for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    dependencies: BTreeMap<String, Dependencies>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for every container declared in `config`.
    #[must_use]
    pub fn from_config(config: &ComposeConfig) -> Self {
        let mut graph = Self::new();
        for (name, descriptor) in &config.containers {
            let _ = graph.insert(name.clone(), Dependencies::from_descriptor(descriptor));
        }
        tracing::debug!(containers = graph.len(), "built dependency graph");
        graph
    }

    /// Inserts or replaces the entry for `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, dependencies: Dependencies) -> Option<Dependencies> {
        self.dependencies.insert(name.into(), dependencies)
    }

    /// Returns the dependencies of `name`, if it is declared.
    pub fn get(&self, name: &str) -> Option<&Dependencies> {
        self.dependencies.get(name)
    }

    /// Whether `name` is a declared container.
    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }

    /// Declared container names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Number of declared containers.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether no container is declared.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Marks `name` as satisfied: drops its entry and discharges it from
    /// every other entry's required list.
    pub fn resolve(&mut self, name: &str) {
        let _ = self.dependencies.remove(name);
        for dependencies in self.dependencies.values_mut() {
            dependencies.remove(name);
        }
    }

    /// Containers that declare a dependency selected by `selector` on `name`.
    pub fn affected_by(&self, name: &str, selector: Selector) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.for_kind(selector).iter().any(|n| n == name))
            .map(|(dependent, _)| dependent.as_str())
            .collect()
    }

    /// Returns `target` in an order where every container comes after the
    /// containers it requires.
    ///
    /// A required dependency outside `target` blocks its owner unless
    /// `force_order` is set, in which case only edges inside `target`
    /// count. Among containers that are ready at the same time, the
    /// alphabetically smallest is taken first.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::UnresolvedDependencies`] naming the leftover
    /// containers if a cycle, an undeclared container, or (unforced) an
    /// external dependency prevents a complete ordering.
    pub fn order<S: AsRef<str>>(&self, target: &[S], force_order: bool) -> Result<Vec<String>> {
        let members: BTreeSet<&str> = target.iter().map(AsRef::as_ref).collect();
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for &name in &members {
            let Some(deps) = self.dependencies.get(name) else {
                tracing::debug!(container = name, "undeclared container cannot be ordered");
                let _ = pending.insert(name, 1);
                continue;
            };
            let mut remaining = 0;
            for dep in deps.required() {
                if members.contains(dep.as_str()) {
                    dependents.entry(dep.as_str()).or_default().push(name);
                    remaining += 1;
                } else if force_order {
                    tracing::debug!(container = name, dependency = %dep, "ignoring dependency outside target");
                } else {
                    remaining += 1;
                }
            }
            let _ = pending.insert(name, remaining);
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|&(_, &remaining)| remaining == 0)
            .map(|(&name, _)| name)
            .collect();
        let mut order = Vec::with_capacity(members.len());

        while let Some(name) = ready.pop_first() {
            order.push(name.to_string());
            for &dependent in dependents.get(name).map_or(&[][..], Vec::as_slice) {
                if let Some(remaining) = pending.get_mut(dependent) {
                    *remaining = remaining.saturating_sub(1);
                    if *remaining == 0 {
                        let _ = ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() < members.len() {
            let containers: Vec<String> = pending
                .iter()
                .filter(|&(_, &remaining)| remaining > 0)
                .map(|(&name, _)| name.to_string())
                .collect();
            return Err(BerthError::UnresolvedDependencies { containers });
        }

        tracing::debug!(?order, force_order, "ordered containers");
        Ok(order)
    }

    /// Renders the graph in DOT format.
    ///
    /// Edges point from a container to what it depends on; `link` edges
    /// are solid, `volumesFrom` dashed, `net` dotted. Containers in
    /// `targeted` are filled.
    pub fn to_dot<S: AsRef<str>>(&self, targeted: &[S]) -> String {
        let targeted: BTreeSet<&str> = targeted.iter().map(AsRef::as_ref).collect();
        let mut graph: DiGraph<&str, DependencyKind> = DiGraph::new();
        let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();

        for name in self.names() {
            let _ = nodes.insert(name, graph.add_node(name));
        }
        for (name, deps) in &self.dependencies {
            let from = nodes[name.as_str()];
            for (dep, kind) in deps.edges() {
                let to = *nodes.entry(dep).or_insert_with(|| graph.add_node(dep));
                let _ = graph.add_edge(from, to, kind);
            }
        }

        let node_attrs = |_, (_, name): (NodeIndex, &&str)| {
            if targeted.contains(*name) {
                "style = filled fillcolor = lightblue".to_string()
            } else {
                String::new()
            }
        };
        let dot = Dot::with_attr_getters(
            &graph,
            &[Config::EdgeNoLabel],
            &|_, edge| format!("style = {}", edge_style(*edge.weight())),
            &node_attrs,
        );
        format!("{dot}")
    }
}

const fn edge_style(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Link => "solid",
        DependencyKind::VolumesFrom => "dashed",
        DependencyKind::Net => "dotted",
    }
}
