//! `berth plan` — Display the unit of work before applying it.

use berth_compose::action::{Action, Command};
use berth_compose::unit_of_work::Role;
use clap::Args;

use super::project::Project;
use super::{Cli, TargetArgs};
use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Command to plan (run, stop, rm, ...).
    #[arg(long, default_value = "run")]
    pub command: Command,

    /// Target to plan for.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Executes the `plan` command.
///
/// Resolves the target, plans the unit of work, and lists every
/// container in dependency order with its role and planned action.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved or planned.
pub fn execute(project: &Project, cli: &Cli, args: &PlanArgs) -> anyhow::Result<()> {
    let (target, unit) = project.unit_of_work(cli, &args.target)?;
    let steps = unit.plan(args.command);

    println!("Plan for `{}` from: {}", args.command, project.path.display());
    println!("{}", "\u{2550}".repeat(40));
    println!();

    for name in unit.containers() {
        let role = unit.role(name).unwrap_or(Role::OrderingOnly);
        let action = steps
            .iter()
            .find(|step| step.container == name)
            .map(|step| step.action);
        println!("  {}", output::format_entry(name, role, action));
        if let Some(image) = project.config.containers.get(name).and_then(|c| c.image.as_deref()) {
            println!("      image: {image}");
        }
    }

    println!();
    let applied = steps.iter().filter(|s| matches!(s.action, Action::Apply(_))).count();
    let started = steps.len() - applied;
    println!(
        "  {applied} targeted, {started} to ensure started, {} untouched.",
        unit.containers().len() - steps.len()
    );

    if !target.dependencies().is_empty() {
        println!();
        println!("  Cascaded: {}", target.dependencies().join(", "));
    }

    Ok(())
}
