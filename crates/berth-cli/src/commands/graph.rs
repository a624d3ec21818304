//! `berth graph` — Print the dependency graph in DOT format.

use super::project::Project;
use super::{Cli, TargetArgs};

/// Executes the `graph` command.
///
/// Containers in the resolved target are highlighted.
///
/// # Errors
///
/// Returns an error if the target reference is unknown.
pub fn execute(project: &Project, cli: &Cli, args: &TargetArgs) -> anyhow::Result<()> {
    let target = project.target(cli, args)?;
    print!("{}", project.graph.to_dot(&target.all()));
    Ok(())
}
