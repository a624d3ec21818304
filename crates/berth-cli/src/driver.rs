//! Dry-run container driver.
//!
//! Records what a real engine driver would be asked to do, without
//! touching any container engine.

use berth_common::error::Result;
use berth_compose::action::{Command, ContainerDriver};

/// Driver that only records the actions it receives.
#[derive(Debug, Default)]
pub struct DryRunDriver {
    log: Vec<String>,
}

impl DryRunDriver {
    /// Creates an empty driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the driver, returning one line per dispatched action.
    pub fn into_log(self) -> Vec<String> {
        self.log
    }
}

impl ContainerDriver for DryRunDriver {
    fn apply(&mut self, container: &str, command: Command) -> Result<()> {
        tracing::info!(container, %command, "would apply");
        self.log.push(format!("{command} {container}"));
        Ok(())
    }

    fn ensure_started(&mut self, container: &str) -> Result<()> {
        tracing::info!(container, "would start if not running");
        self.log.push(format!("start {container} (if not running)"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use berth_compose::action::{Action, Step, execute};

    use super::*;

    #[test]
    fn records_actions_in_dispatch_order() {
        let steps = vec![
            Step::new("db", Action::EnsureStarted),
            Step::new("web", Action::Apply(Command::Lift)),
        ];
        let mut driver = DryRunDriver::new();
        execute(&steps, &mut driver).expect("should execute");
        assert_eq!(driver.into_log(), vec!["start db (if not running)", "lift web"]);
    }
}
