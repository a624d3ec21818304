//! CLI command definitions and dispatch.

pub mod graph;
pub mod lifecycle;
pub mod plan;
pub mod project;

use std::path::PathBuf;

use berth_common::constants::BIN_NAME;
use berth_compose::action;
use berth_compose::target::{Cascade, CascadeOptions};
use clap::{Args, Parser, Subcommand};

use crate::commands::project::Project;

/// berth — plan and run commands across related containers.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the config file (defaults to berth.yml, berth.yaml or berth.json).
    #[arg(short, long, global = true, env = "BERTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only act on these containers.
    #[arg(long, global = true, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Never act on these containers.
    #[arg(long, global = true, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Log planning details.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Target reference and cascade options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Container or group name; empty means the default group or everything.
    pub target: Option<String>,

    /// Extend the target to everything it depends on.
    #[arg(short, long)]
    pub extend: bool,

    /// Cascade to dependencies of this kind (none, all, link, volumesFrom, net).
    #[arg(long, value_name = "KIND")]
    pub cascade_dependencies: Option<Cascade>,

    /// Cascade to containers affected by the target (none, all, link, volumesFrom, net).
    #[arg(long, value_name = "KIND")]
    pub cascade_affected: Option<Cascade>,
}

impl TargetArgs {
    /// The target reference, empty when none was given.
    pub fn reference(&self) -> &str {
        self.target.as_deref().unwrap_or_default()
    }

    /// Cascade options; explicit kinds override `--extend`.
    pub fn cascade(&self) -> CascadeOptions {
        let base = CascadeOptions::extend(self.extend);
        CascadeOptions {
            dependencies: self.cascade_dependencies.unwrap_or(base.dependencies),
            affected: self.cascade_affected.unwrap_or(base.affected),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision and run containers.
    Lift(TargetArgs),
    /// Run containers, starting what they need.
    Run(TargetArgs),
    /// Create containers without starting them.
    Create(TargetArgs),
    /// Start containers, starting what they need.
    Start(TargetArgs),
    /// Stop containers, dependents first.
    Stop(TargetArgs),
    /// Kill containers, dependents first.
    Kill(TargetArgs),
    /// Remove containers, dependents first.
    Rm(TargetArgs),
    /// Pause containers.
    Pause(TargetArgs),
    /// Unpause containers.
    Unpause(TargetArgs),
    /// Push container images.
    Push(TargetArgs),
    /// Build or pull container images.
    Provision(TargetArgs),
    /// Pull container images.
    Pull(TargetArgs),
    /// Show container logs.
    Logs(TargetArgs),
    /// Show container status.
    Status(TargetArgs),
    /// Display the unit of work without dispatching anything.
    Plan(plan::PlanArgs),
    /// Print the dependency graph in DOT format.
    Graph(TargetArgs),
}

impl Command {
    /// The lifecycle command and its target, for everything but `plan`/`graph`.
    fn lifecycle(&self) -> Option<(action::Command, &TargetArgs)> {
        let pair = match self {
            Self::Lift(args) => (action::Command::Lift, args),
            Self::Run(args) => (action::Command::Run, args),
            Self::Create(args) => (action::Command::Create, args),
            Self::Start(args) => (action::Command::Start, args),
            Self::Stop(args) => (action::Command::Stop, args),
            Self::Kill(args) => (action::Command::Kill, args),
            Self::Rm(args) => (action::Command::Rm, args),
            Self::Pause(args) => (action::Command::Pause, args),
            Self::Unpause(args) => (action::Command::Unpause, args),
            Self::Push(args) => (action::Command::Push, args),
            Self::Provision(args) => (action::Command::Provision, args),
            Self::Pull(args) => (action::Command::Pull, args),
            Self::Logs(args) => (action::Command::Logs, args),
            Self::Status(args) => (action::Command::Status, args),
            Self::Plan(_) | Self::Graph(_) => return None,
        };
        Some(pair)
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if loading, planning, or dispatching fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let project = Project::load(cli.config.as_deref())?;

    if let Some((command, args)) = cli.command.lifecycle() {
        return lifecycle::execute(&project, &cli, command, args);
    }
    match &cli.command {
        Command::Plan(args) => plan::execute(&project, &cli, args),
        Command::Graph(args) => graph::execute(&project, &cli, args),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use berth_compose::dependencies::DependencyKind;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn parses_global_filters_after_subcommand() {
        let cli = Cli::try_parse_from(["berth", "run", "web", "--exclude", "db,cache", "--only", "web"])
            .expect("should parse");
        assert_eq!(cli.exclude, vec!["db", "cache"]);
        assert_eq!(cli.only, vec!["web"]);
        let (command, args) = cli.command.lifecycle().expect("lifecycle");
        assert_eq!(command, action::Command::Run);
        assert_eq!(args.reference(), "web");
    }

    #[test]
    fn missing_target_is_empty_reference() {
        let cli = Cli::try_parse_from(["berth", "stop"]).expect("should parse");
        let (_, args) = cli.command.lifecycle().expect("lifecycle");
        assert_eq!(args.reference(), "");
        assert_eq!(args.cascade(), CascadeOptions::default());
    }

    #[test]
    fn extend_cascades_to_all_dependencies() {
        let cli = Cli::try_parse_from(["berth", "start", "-e", "web"]).expect("should parse");
        let (_, args) = cli.command.lifecycle().expect("lifecycle");
        assert_eq!(args.cascade(), CascadeOptions::extend(true));
    }

    #[test]
    fn explicit_cascade_kinds_override_extend() {
        let cli = Cli::try_parse_from([
            "berth",
            "rm",
            "db",
            "--extend",
            "--cascade-dependencies",
            "none",
            "--cascade-affected",
            "link",
        ])
        .expect("should parse");
        let (_, args) = cli.command.lifecycle().expect("lifecycle");
        assert_eq!(
            args.cascade(),
            CascadeOptions {
                dependencies: Cascade::None,
                affected: Cascade::Kind(DependencyKind::Link),
            }
        );
    }

    #[test]
    fn unknown_cascade_kind_is_rejected() {
        let result = Cli::try_parse_from(["berth", "run", "--cascade-affected", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn plan_and_graph_are_not_lifecycle_commands() {
        let cli = Cli::try_parse_from(["berth", "graph"]).expect("should parse");
        assert!(cli.command.lifecycle().is_none());
        let cli = Cli::try_parse_from(["berth", "plan", "--command", "stop", "web"]).expect("should parse");
        assert!(cli.command.lifecycle().is_none());
        let Command::Plan(args) = &cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.command, action::Command::Stop);
        assert_eq!(args.target.reference(), "web");
    }

    #[test]
    fn plan_takes_target_as_first_positional() {
        let cli = Cli::try_parse_from(["berth", "plan", "web"]).expect("should parse");
        let Command::Plan(args) = &cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.command, action::Command::Run);
        assert_eq!(args.target.reference(), "web");
    }

    #[test]
    fn binary_name_comes_from_constants() {
        assert_eq!(Cli::command().get_name(), BIN_NAME);
    }
}
