//! Workspace-wide constants and default file names.

use std::path::{Path, PathBuf};

/// Application name used in CLI output.
pub const APP_NAME: &str = "berth";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "berth";

/// Config file names tried, in order, when no explicit path is given.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["berth.yml", "berth.yaml", "berth.json"];

/// Name of the group used when a command is given no target.
pub const DEFAULT_GROUP: &str = "default";

/// Prefix of a `net` value that shares another container's network namespace.
pub const NET_CONTAINER_PREFIX: &str = "container:";

/// Returns the first existing config file inside `dir`, if any.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
