//! Formatted output helpers for CLI commands.

use berth_compose::action::Action;
use berth_compose::unit_of_work::Role;

/// Short marker for a container's role in a plan.
#[must_use]
pub const fn role_marker(role: Role) -> &'static str {
    match role {
        Role::Targeted => "+",
        Role::MustRun => "~",
        Role::OrderingOnly => "-",
    }
}

/// Formats one plan line: marker, name, and planned action.
#[must_use]
pub fn format_entry(name: &str, role: Role, action: Option<Action>) -> String {
    let action = action.map_or_else(|| "no action".to_string(), |a| a.to_string());
    format!("{} {name:<24} {action}", role_marker(role))
}

#[cfg(test)]
mod tests {
    use berth_compose::action::Command;

    use super::*;

    #[test]
    fn format_entry_for_targeted_container() {
        let line = format_entry("web", Role::Targeted, Some(Action::Apply(Command::Run)));
        assert!(line.starts_with("+ web"), "got: {line}");
        assert!(line.ends_with(" run"), "got: {line}");
    }

    #[test]
    fn format_entry_for_must_run_container() {
        let line = format_entry("db", Role::MustRun, Some(Action::EnsureStarted));
        assert!(line.starts_with("~ db"), "got: {line}");
        assert!(line.ends_with("ensure started"), "got: {line}");
    }

    #[test]
    fn format_entry_without_action() {
        let line = format_entry("data", Role::OrderingOnly, None);
        assert!(line.starts_with("- data"), "got: {line}");
        assert!(line.ends_with("no action"), "got: {line}");
    }
}
