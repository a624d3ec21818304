//! Unified error type for the berth workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
///
/// Every variant is terminal for the command being planned: nothing is
/// retried and no container action has been dispatched when one is returned.
#[derive(Debug, Error)]
pub enum BerthError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A target matched neither a declared container nor a group.
    #[error("no group or container matching `{reference}`")]
    UnknownReference {
        /// The offending target reference.
        reference: String,
    },

    /// Some containers could not be placed in dependency order.
    #[error("dependencies could not be resolved for: {}", containers.join(", "))]
    UnresolvedDependencies {
        /// Containers left unordered, sorted by name.
        containers: Vec<String>,
    },

    /// Filtering left nothing to act on.
    #[error("command cannot be applied to any container")]
    NoApplicableContainers,

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BerthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_dependencies_lists_containers() {
        let err = BerthError::UnresolvedDependencies {
            containers: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "dependencies could not be resolved for: a, b");
    }

    #[test]
    fn unknown_reference_names_the_reference() {
        let err = BerthError::UnknownReference {
            reference: "ghost".into(),
        };
        assert!(err.to_string().contains("ghost"));
    }
}
