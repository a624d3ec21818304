//! Target resolution.
//!
//! Turns a user reference (empty, a group, or a container) into the set of
//! containers a command applies to, optionally cascaded along dependency
//! edges towards what the targets need and/or what needs them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use berth_common::constants::DEFAULT_GROUP;
use berth_common::error::{BerthError, Result};

use crate::dependencies::{DependencyKind, Selector};
use crate::graph::DependencyGraph;

/// Which relationship kinds a cascade follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cascade {
    /// No cascading.
    #[default]
    None,
    /// Every kind.
    All,
    /// A single kind.
    Kind(DependencyKind),
}

impl Cascade {
    fn selector(self) -> Option<Selector> {
        match self {
            Self::None => None,
            Self::All => Some(Selector::All),
            Self::Kind(kind) => Some(Selector::Kind(kind)),
        }
    }
}

impl FromStr for Cascade {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        match s.parse::<Selector>()? {
            Selector::All => Ok(Self::All),
            Selector::Kind(kind) => Ok(Self::Kind(kind)),
            Selector::Required => Err(BerthError::Config {
                message: format!("cannot cascade along `{s}`; expected none, all, link, volumesFrom or net"),
            }),
        }
    }
}

impl fmt::Display for Cascade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::All => write!(f, "all"),
            Self::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Cascade directions, each filtered independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Follow edges towards what the targets depend on.
    pub dependencies: Cascade,
    /// Follow edges back to containers that depend on the targets.
    pub affected: Cascade,
}

impl CascadeOptions {
    /// Options for the plain "extend to dependencies" switch.
    #[must_use]
    pub const fn extend(extend: bool) -> Self {
        Self {
            dependencies: if extend { Cascade::All } else { Cascade::None },
            affected: Cascade::None,
        }
    }

    const fn is_enabled(self) -> bool {
        !matches!(
            (self.dependencies, self.affected),
            (Cascade::None, Cascade::None)
        )
    }
}

/// Containers a command may act on, derived from include/exclude filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    allowed: Option<BTreeSet<String>>,
}

impl AllowList {
    /// Allows every container.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Starts from `only` (or every declared name when `only` is empty)
    /// and removes `exclude`.
    #[must_use]
    pub fn from_filters<S: AsRef<str>>(declared: &[S], only: &[S], exclude: &[S]) -> Self {
        if only.is_empty() && exclude.is_empty() {
            return Self::all();
        }
        let base = if only.is_empty() { declared } else { only };
        let excluded: BTreeSet<&str> = exclude.iter().map(AsRef::as_ref).collect();
        let allowed = base
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !excluded.contains(name))
            .map(str::to_string)
            .collect();
        Self {
            allowed: Some(allowed),
        }
    }

    /// Whether `name` may be acted on.
    pub fn allows(&self, name: &str) -> bool {
        self.allowed.as_ref().is_none_or(|allowed| allowed.contains(name))
    }
}

/// Everything target resolution reads, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Graph of declared containers.
    pub graph: &'a DependencyGraph,
    /// Group name to member list.
    pub groups: &'a BTreeMap<String, Vec<String>>,
    /// Filter applied to explicitly referenced containers.
    pub allow_list: &'a AllowList,
    /// Cascade directions.
    pub cascade: CascadeOptions,
}

/// The containers a command applies to.
///
/// Explicitly referenced containers and containers pulled in by cascading
/// are kept apart so callers can tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    initial: Vec<String>,
    dependencies: Vec<String>,
}

impl Target {
    /// Resolves `reference` against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`BerthError::UnknownReference`] if a non-empty reference is
    /// neither a group nor a declared container.
    pub fn resolve(context: &ResolutionContext<'_>, reference: &str) -> Result<Self> {
        let explicit = explicit_names(context, reference)?;

        let mut initial: Vec<String> = Vec::with_capacity(explicit.len());
        for name in explicit {
            if !context.allow_list.allows(name) {
                tracing::debug!(container = name, "dropped by include/exclude filters");
                continue;
            }
            if !initial.iter().any(|n| n == name) {
                initial.push(name.to_string());
            }
        }

        let dependencies = if context.cascade.is_enabled() {
            cascade(context, &initial)
        } else {
            Vec::new()
        };

        tracing::info!(reference, ?initial, ?dependencies, "resolved target");
        Ok(Self {
            initial,
            dependencies,
        })
    }

    /// Explicitly referenced containers that passed the filters.
    pub fn initial(&self) -> &[String] {
        &self.initial
    }

    /// Containers pulled in only by cascading.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Both lists combined, sorted and without duplicates.
    pub fn all(&self) -> Vec<String> {
        self.initial
            .iter()
            .chain(&self.dependencies)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn explicit_names<'a>(context: &ResolutionContext<'a>, reference: &'a str) -> Result<Vec<&'a str>> {
    if reference.is_empty() {
        return Ok(context.groups.get(DEFAULT_GROUP).map_or_else(
            || context.graph.names().collect(),
            |members| members.iter().map(String::as_str).collect(),
        ));
    }
    if let Some(members) = context.groups.get(reference) {
        return Ok(members.iter().map(String::as_str).collect());
    }
    if context.graph.contains(reference) {
        return Ok(vec![reference]);
    }
    Err(BerthError::UnknownReference {
        reference: reference.to_string(),
    })
}

/// Walks outward from `seeds` wave by wave until nothing new turns up.
///
/// Returns the newly reached declared containers, sorted.
fn cascade(context: &ResolutionContext<'_>, seeds: &[String]) -> Vec<String> {
    let graph = context.graph;
    let forward = context.cascade.dependencies.selector();
    let backward = context.cascade.affected.selector();

    let mut seen: BTreeSet<&str> = seeds.iter().map(String::as_str).collect();
    let mut reached: BTreeSet<&str> = BTreeSet::new();
    let mut wave: Vec<&str> = seen.iter().copied().collect();

    while !wave.is_empty() {
        let mut next = Vec::new();
        for &seed in &wave {
            let mut neighbours: Vec<&str> = Vec::new();
            if let (Some(selector), Some(deps)) = (forward, graph.get(seed)) {
                neighbours.extend(deps.for_kind(selector).iter().map(String::as_str));
            }
            if let Some(selector) = backward {
                neighbours.extend(graph.affected_by(seed, selector));
            }
            for name in neighbours {
                if !seen.insert(name) {
                    continue;
                }
                if graph.contains(name) {
                    let _ = reached.insert(name);
                    next.push(name);
                } else {
                    tracing::warn!(container = name, "ignoring undeclared container reached by cascade");
                }
            }
        }
        tracing::debug!(wave = ?next, "cascade wave");
        wave = next;
    }

    reached.into_iter().map(str::to_string).collect()
}
