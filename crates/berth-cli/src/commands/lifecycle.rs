//! `berth <command>` — plan a lifecycle command and dispatch its steps.

use berth_compose::action::{self, Command};

use super::project::Project;
use super::{Cli, TargetArgs};
use crate::driver::DryRunDriver;

/// Executes a lifecycle command against the dry-run driver.
///
/// Planning completes before the first step is dispatched, so a bad
/// target or graph never leaves containers half-handled.
///
/// # Errors
///
/// Returns an error if the target cannot be planned or a step fails.
pub fn execute(project: &Project, cli: &Cli, command: Command, args: &TargetArgs) -> anyhow::Result<()> {
    let (_target, unit) = project.unit_of_work(cli, args)?;
    let steps = unit.plan(command);
    tracing::info!(%command, steps = steps.len(), "dispatching plan");

    let mut driver = DryRunDriver::new();
    action::execute(&steps, &mut driver)?;
    for line in driver.into_log() {
        println!("{line}");
    }
    Ok(())
}
