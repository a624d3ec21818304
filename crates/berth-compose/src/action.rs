//! Per-command action dispatch.
//!
//! Commands that bring containers up also make sure their running
//! prerequisites are started; commands that tear down or inspect only ever
//! touch what was targeted.

use std::fmt;
use std::str::FromStr;

use berth_common::error::{BerthError, Result};

/// A user-facing lifecycle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Provision, then run.
    Lift,
    /// Create and start, replacing existing containers.
    Run,
    /// Create without starting.
    Create,
    /// Start existing containers.
    Start,
    /// Stop running containers.
    Stop,
    /// Kill running containers.
    Kill,
    /// Remove containers.
    Rm,
    /// Pause running containers.
    Pause,
    /// Unpause paused containers.
    Unpause,
    /// Push images.
    Push,
    /// Build or pull images.
    Provision,
    /// Pull images.
    Pull,
    /// Show logs.
    Logs,
    /// Show status.
    Status,
}

/// Which part of a unit of work a command walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The whole closure; running prerequisites get started.
    WithPrerequisites,
    /// Only the targeted containers.
    TargetedOnly,
}

impl Command {
    /// The part of the unit of work this command walks.
    #[must_use]
    pub const fn scope(self) -> Scope {
        match self {
            Self::Lift | Self::Run | Self::Create | Self::Start => Scope::WithPrerequisites,
            Self::Stop
            | Self::Kill
            | Self::Rm
            | Self::Pause
            | Self::Unpause
            | Self::Push
            | Self::Provision
            | Self::Pull
            | Self::Logs
            | Self::Status => Scope::TargetedOnly,
        }
    }

    /// Whether dependents are handled before their dependencies.
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::Stop | Self::Kill | Self::Rm)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lift => "lift",
            Self::Run => "run",
            Self::Create => "create",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Kill => "kill",
            Self::Rm => "rm",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Push => "push",
            Self::Provision => "provision",
            Self::Pull => "pull",
            Self::Logs => "logs",
            Self::Status => "status",
        };
        f.write_str(name)
    }
}

impl FromStr for Command {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s {
            "lift" => Self::Lift,
            "run" => Self::Run,
            "create" => Self::Create,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "kill" => Self::Kill,
            "rm" => Self::Rm,
            "pause" => Self::Pause,
            "unpause" => Self::Unpause,
            "push" => Self::Push,
            "provision" => Self::Provision,
            "pull" => Self::Pull,
            "logs" => Self::Logs,
            "status" => Self::Status,
            _ => {
                return Err(BerthError::Config {
                    message: format!("unknown command: {s}"),
                });
            }
        };
        Ok(command)
    }
}

/// What happens to one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The full requested command.
    Apply(Command),
    /// Start the container only if it is not already running.
    EnsureStarted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply(command) => write!(f, "{command}"),
            Self::EnsureStarted => f.write_str("ensure started"),
        }
    }
}

/// One planned action on one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Container name.
    pub container: String,
    /// Action to take.
    pub action: Action,
}

impl Step {
    /// Creates a step.
    #[must_use]
    pub fn new(container: impl Into<String>, action: Action) -> Self {
        Self {
            container: container.into(),
            action,
        }
    }
}

/// Executes planned actions against a container engine.
///
/// Implementors decide how a command becomes engine calls; planning has
/// already decided which containers are touched and in what order.
pub trait ContainerDriver {
    /// Applies `command` to `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the command.
    fn apply(&mut self, container: &str, command: Command) -> Result<()>;

    /// Starts `container` unless it is already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be started.
    fn ensure_started(&mut self, container: &str) -> Result<()>;
}

/// Runs `steps` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first error reported by `driver`.
pub fn execute(steps: &[Step], driver: &mut dyn ContainerDriver) -> Result<()> {
    for step in steps {
        tracing::debug!(container = %step.container, action = %step.action, "dispatching");
        match step.action {
            Action::Apply(command) => driver.apply(&step.container, command)?,
            Action::EnsureStarted => driver.ensure_started(&step.container)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDriver {
        calls: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl ContainerDriver for RecordingDriver {
        fn apply(&mut self, container: &str, command: Command) -> Result<()> {
            if self.fail_on == Some(container) {
                return Err(BerthError::Config {
                    message: format!("{command} failed for {container}"),
                });
            }
            self.calls.push(format!("{command} {container}"));
            Ok(())
        }

        fn ensure_started(&mut self, container: &str) -> Result<()> {
            self.calls.push(format!("ensure {container}"));
            Ok(())
        }
    }

    #[test]
    fn bring_up_commands_include_prerequisites() {
        for command in [Command::Lift, Command::Run, Command::Create, Command::Start] {
            assert_eq!(command.scope(), Scope::WithPrerequisites, "{command}");
            assert!(!command.is_reversed());
        }
    }

    #[test]
    fn teardown_commands_are_reversed_and_targeted_only() {
        for command in [Command::Stop, Command::Kill, Command::Rm] {
            assert_eq!(command.scope(), Scope::TargetedOnly, "{command}");
            assert!(command.is_reversed());
        }
        assert!(!Command::Pause.is_reversed());
        assert_eq!(Command::Provision.scope(), Scope::TargetedOnly);
    }

    #[test]
    fn execute_dispatches_in_order() {
        let steps = vec![
            Step::new("db", Action::EnsureStarted),
            Step::new("web", Action::Apply(Command::Run)),
        ];
        let mut driver = RecordingDriver::default();
        execute(&steps, &mut driver).expect("should execute");
        assert_eq!(driver.calls, vec!["ensure db", "run web"]);
    }

    #[test]
    fn execute_stops_at_first_failure() {
        let steps = vec![
            Step::new("a", Action::Apply(Command::Stop)),
            Step::new("b", Action::Apply(Command::Stop)),
            Step::new("c", Action::Apply(Command::Stop)),
        ];
        let mut driver = RecordingDriver {
            fail_on: Some("b"),
            ..RecordingDriver::default()
        };
        let err = execute(&steps, &mut driver).unwrap_err();
        assert!(err.to_string().contains("stop failed for b"), "got: {err}");
        assert_eq!(driver.calls, vec!["stop a"]);
    }

    #[test]
    fn command_names_parse_back() {
        for command in [Command::Lift, Command::Rm, Command::Unpause, Command::Status] {
            assert_eq!(command.to_string().parse::<Command>().ok(), Some(command));
        }
        assert!("restart".parse::<Command>().is_err());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Apply(Command::Unpause).to_string(), "unpause");
        assert_eq!(Action::EnsureStarted.to_string(), "ensure started");
    }
}
