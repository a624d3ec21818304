//! Container descriptors and named groups.
//!
//! Only the fields that produce dependency edges are interpreted here;
//! everything else about a container is opaque to the planning core.

use std::collections::BTreeMap;
use std::path::Path;

use berth_common::constants::NET_CONTAINER_PREFIX;
use berth_common::error::{BerthError, Result};
use serde::Deserialize;

/// A single declared container, as far as dependencies are concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerDescriptor {
    /// Image reference, kept for display only.
    #[serde(default)]
    pub image: Option<String>,
    /// Linked containers, each `name` or `name:alias`.
    #[serde(default)]
    pub link: Vec<String>,
    /// Network mode; `container:<name>` shares that container's namespace.
    #[serde(default)]
    pub net: Option<String>,
    /// Containers whose volumes are mounted, each `name` or `name:ro|rw`.
    #[serde(default, alias = "volumesFrom")]
    pub volumes_from: Vec<String>,
}

impl ContainerDescriptor {
    /// Names of the containers this one links to.
    pub fn link_targets(&self) -> impl Iterator<Item = &str> {
        self.link.iter().map(|entry| strip_suffix(entry))
    }

    /// Name of the container whose network namespace is shared, if any.
    ///
    /// Network modes such as `host` or `bridge` do not name a container.
    pub fn net_target(&self) -> Option<&str> {
        self.net
            .as_deref()
            .and_then(|net| net.strip_prefix(NET_CONTAINER_PREFIX))
            .filter(|name| !name.is_empty())
    }

    /// Names of the containers whose volumes are mounted.
    pub fn volumes_from_targets(&self) -> impl Iterator<Item = &str> {
        self.volumes_from.iter().map(|entry| strip_suffix(entry))
    }
}

fn strip_suffix(entry: &str) -> &str {
    entry.split_once(':').map_or(entry, |(name, _)| name)
}

/// A parsed compose file: containers keyed by name plus named groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ComposeConfig {
    /// Declared containers.
    #[serde(default)]
    pub containers: BTreeMap<String, ContainerDescriptor>,
    /// Group name to ordered member list.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl ComposeConfig {
    /// Loads and validates a config file, picking the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, fails to parse, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading compose config");

        let content = std::fs::read_to_string(path).map_err(|e| BerthError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(BerthError::Config {
                message: format!(
                    "unsupported config file extension: {} (expected .yml, .yaml or .json)",
                    path.display()
                ),
            }),
        }
    }

    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every group member is a declared container.
    ///
    /// Dependencies on undeclared containers are accepted here; they
    /// surface later as unresolvable when ordering.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the first offending group member.
    pub fn validate(&self) -> Result<()> {
        for (group, members) in &self.groups {
            if let Some(missing) = members.iter().find(|m| !self.containers.contains_key(*m)) {
                return Err(BerthError::Config {
                    message: format!("group \"{group}\" references undeclared container \"{missing}\""),
                });
            }
        }
        Ok(())
    }

    /// Returns every declared container name, sorted.
    pub fn container_names(&self) -> Vec<String> {
        self.containers.keys().cloned().collect()
    }
}
