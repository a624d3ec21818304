//! Per-container dependency model.
//!
//! A [`Dependencies`] entry records every container another container
//! relates to, tagged by [`DependencyKind`], and which of those relations
//! still constrain ordering.

use std::fmt;
use std::str::FromStr;

use berth_common::error::BerthError;

use crate::config::ContainerDescriptor;

/// Structural relationship between two containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    /// Depends on another container's exposed endpoint.
    Link,
    /// Mounts another container's declared volumes.
    VolumesFrom,
    /// Shares another container's network namespace.
    Net,
}

impl DependencyKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::Link, Self::VolumesFrom, Self::Net];

    /// Whether the depended-upon container must be running, not just exist.
    #[must_use]
    pub const fn requires_running(self) -> bool {
        match self {
            Self::Link | Self::Net => true,
            Self::VolumesFrom => false,
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::VolumesFrom => write!(f, "volumesFrom"),
            Self::Net => write!(f, "net"),
        }
    }
}

/// Which of a container's dependency lists to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Every related container.
    All,
    /// Containers that still constrain ordering.
    Required,
    /// Containers related by one kind only.
    Kind(DependencyKind),
}

impl FromStr for Selector {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "required" => Ok(Self::Required),
            "link" => Ok(Self::Kind(DependencyKind::Link)),
            "volumesfrom" | "volumes-from" => Ok(Self::Kind(DependencyKind::VolumesFrom)),
            "net" => Ok(Self::Kind(DependencyKind::Net)),
            _ => Err(BerthError::Config {
                message: format!("unknown dependency kind: {s}"),
            }),
        }
    }
}

/// Dependencies of a single container.
///
/// Invariants: every name in a per-kind list is also in `all`, and every
/// name added as required is in `required` until [`Dependencies::remove`]
/// discharges it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    all: Vec<String>,
    required: Vec<String>,
    link: Vec<String>,
    volumes_from: Vec<String>,
    net: Option<String>,
}

impl Dependencies {
    /// Creates an entry with no dependencies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the entry for a declared container.
    ///
    /// Every structural dependency is required for ordering.
    #[must_use]
    pub fn from_descriptor(descriptor: &ContainerDescriptor) -> Self {
        let mut deps = Self::new();
        for name in descriptor.link_targets() {
            deps.add(name, DependencyKind::Link, true);
        }
        for name in descriptor.volumes_from_targets() {
            deps.add(name, DependencyKind::VolumesFrom, true);
        }
        if let Some(name) = descriptor.net_target() {
            deps.add(name, DependencyKind::Net, true);
        }
        deps
    }

    /// Registers a relationship. Repeated calls are no-ops.
    ///
    /// `Net` is single-valued: a later `Net` replaces the earlier one, and
    /// the replaced name is dropped entirely unless another kind still
    /// relates it.
    pub fn add(&mut self, name: &str, kind: DependencyKind, required: bool) {
        push_unique(&mut self.all, name);
        if required {
            push_unique(&mut self.required, name);
        }
        match kind {
            DependencyKind::Link => push_unique(&mut self.link, name),
            DependencyKind::VolumesFrom => push_unique(&mut self.volumes_from, name),
            DependencyKind::Net => {
                if let Some(previous) = self.net.replace(name.to_string()) {
                    if previous != name && !self.link.contains(&previous) && !self.volumes_from.contains(&previous) {
                        self.all.retain(|n| *n != previous);
                        self.required.retain(|n| *n != previous);
                    }
                }
            }
        }
    }

    /// Whether `name` is related to this container in any way.
    pub fn includes(&self, name: &str) -> bool {
        self.all.iter().any(|n| n == name)
    }

    /// Whether `name` is related to this container by `kind`.
    pub fn includes_as_kind(&self, name: &str, kind: DependencyKind) -> bool {
        self.for_kind(Selector::Kind(kind)).iter().any(|n| n == name)
    }

    /// Returns the list selected by `selector`.
    pub fn for_kind(&self, selector: Selector) -> &[String] {
        match selector {
            Selector::All => &self.all,
            Selector::Required => &self.required,
            Selector::Kind(DependencyKind::Link) => &self.link,
            Selector::Kind(DependencyKind::VolumesFrom) => &self.volumes_from,
            Selector::Kind(DependencyKind::Net) => self.net.as_slice(),
        }
    }

    /// Every related container.
    pub fn all(&self) -> &[String] {
        &self.all
    }

    /// Containers that still have to be ordered before this one.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether `name` has to be running for this container to work.
    pub fn must_run(&self, name: &str) -> bool {
        self.net.as_deref() == Some(name) || self.link.iter().any(|n| n == name)
    }

    /// Whether nothing constrains ordering any more.
    pub fn satisfied(&self) -> bool {
        self.required.is_empty()
    }

    /// Discharges `name` from the required list only.
    ///
    /// The structural lists are kept for diagnostics.
    pub fn remove(&mut self, name: &str) {
        self.required.retain(|n| n != name);
    }

    /// Iterates over `(name, kind)` pairs for every structural relationship.
    pub fn edges(&self) -> impl Iterator<Item = (&str, DependencyKind)> {
        DependencyKind::ALL.into_iter().flat_map(move |kind| {
            self.for_kind(Selector::Kind(kind))
                .iter()
                .map(move |name| (name.as_str(), kind))
        })
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut deps = Dependencies::new();
        deps.add("db", DependencyKind::Link, true);
        deps.add("db", DependencyKind::Link, true);
        assert_eq!(deps.all(), ["db"]);
        assert_eq!(deps.required(), ["db"]);
        assert_eq!(deps.for_kind(Selector::Kind(DependencyKind::Link)), ["db"]);
    }

    #[test]
    fn same_name_under_two_kinds_appears_once_in_all() {
        let mut deps = Dependencies::new();
        deps.add("db", DependencyKind::Link, true);
        deps.add("db", DependencyKind::VolumesFrom, true);
        assert_eq!(deps.all(), ["db"]);
        assert!(deps.includes_as_kind("db", DependencyKind::Link));
        assert!(deps.includes_as_kind("db", DependencyKind::VolumesFrom));
        assert!(!deps.includes_as_kind("db", DependencyKind::Net));
    }

    #[test]
    fn replacing_net_drops_previous_target() {
        let mut deps = Dependencies::new();
        deps.add("proxy", DependencyKind::Net, true);
        deps.add("gateway", DependencyKind::Net, true);
        assert_eq!(deps.all(), ["gateway"]);
        assert_eq!(deps.required(), ["gateway"]);
        assert!(!deps.includes("proxy"));
        assert!(deps.must_run("gateway"));
        let edges: Vec<_> = deps.edges().collect();
        assert_eq!(edges, vec![("gateway", DependencyKind::Net)]);
    }

    #[test]
    fn replacing_net_keeps_target_still_linked() {
        let mut deps = Dependencies::new();
        deps.add("proxy", DependencyKind::Link, true);
        deps.add("proxy", DependencyKind::Net, true);
        deps.add("gateway", DependencyKind::Net, true);
        assert_eq!(deps.all(), ["proxy", "gateway"]);
        assert!(deps.must_run("proxy"));
        assert!(deps.includes_as_kind("proxy", DependencyKind::Link));
        assert!(!deps.includes_as_kind("proxy", DependencyKind::Net));
    }

    #[test]
    fn optional_dependency_does_not_constrain_ordering() {
        let mut deps = Dependencies::new();
        deps.add("cache", DependencyKind::Link, false);
        assert!(deps.includes("cache"));
        assert!(deps.satisfied());
    }

    #[test]
    fn must_run_covers_link_and_net_only() {
        let mut deps = Dependencies::new();
        deps.add("api", DependencyKind::Link, true);
        deps.add("proxy", DependencyKind::Net, true);
        deps.add("data", DependencyKind::VolumesFrom, true);
        assert!(deps.must_run("api"));
        assert!(deps.must_run("proxy"));
        assert!(!deps.must_run("data"));
        assert!(!deps.must_run("other"));
    }

    #[test]
    fn remove_only_touches_required() {
        let mut deps = Dependencies::new();
        deps.add("db", DependencyKind::Link, true);
        assert!(!deps.satisfied());
        deps.remove("db");
        assert!(deps.satisfied());
        assert!(deps.includes("db"));
        assert!(deps.must_run("db"));
    }

    #[test]
    fn from_descriptor_collects_every_kind() {
        let descriptor = ContainerDescriptor {
            link: vec!["api:backend".into()],
            net: Some("container:proxy".into()),
            volumes_from: vec!["data:ro".into()],
            ..ContainerDescriptor::default()
        };
        let deps = Dependencies::from_descriptor(&descriptor);
        assert_eq!(deps.all(), ["api", "data", "proxy"]);
        assert_eq!(deps.required(), ["api", "data", "proxy"]);
        assert_eq!(deps.for_kind(Selector::Kind(DependencyKind::Net)), ["proxy"]);
        let edges: Vec<_> = deps.edges().collect();
        assert_eq!(
            edges,
            vec![
                ("api", DependencyKind::Link),
                ("data", DependencyKind::VolumesFrom),
                ("proxy", DependencyKind::Net),
            ]
        );
    }

    #[test]
    fn selector_parses_known_kinds() {
        assert_eq!("all".parse::<Selector>().ok(), Some(Selector::All));
        assert_eq!(
            "volumesFrom".parse::<Selector>().ok(),
            Some(Selector::Kind(DependencyKind::VolumesFrom))
        );
        assert_eq!(
            "volumes-from".parse::<Selector>().ok(),
            Some(Selector::Kind(DependencyKind::VolumesFrom))
        );
        assert!("bogus".parse::<Selector>().is_err());
    }

    #[test]
    fn requires_running_matches_kind_table() {
        assert!(DependencyKind::Link.requires_running());
        assert!(DependencyKind::Net.requires_running());
        assert!(!DependencyKind::VolumesFrom.requires_running());
    }
}
