//! Scanner for the line-marker plan protocol.
//!
//! ```text
//! SUMMARY: <summary>
//! COMMANDS:
//! - <command> | <description> | <true|false>
//! WARNINGS:
//! - <warning>
//! ```
//!
//! Anything that does not fit the protocol is dropped.

use super::{Command, Plan};

const SUMMARY_MARKER: &str = "SUMMARY:";
const COMMANDS_MARKER: &str = "COMMANDS:";
const WARNINGS_MARKER: &str = "WARNINGS:";
const COMMAND_PREFIX: &str = "kubectl";
const ITEM_MARKER: char = '-';

/// Which section of the response the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Commands,
    Warnings,
}

/// Parse a free-text AI response into a plan.
///
/// The plan always has at least one command: when none parse, a safe
/// placeholder pointing back at the query is added.
pub fn parse_response(response: &str, query: &str, dry_run: bool) -> Plan {
    let mut summary = format!("Execution plan for: {query}");
    let mut commands = Vec::new();
    let mut warnings = Vec::new();
    let mut section = Section::Header;

    for line in response.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(SUMMARY_MARKER) {
            summary = rest.trim().to_string();
            continue;
        }
        if line.starts_with(COMMANDS_MARKER) {
            section = Section::Commands;
            continue;
        }
        if line.starts_with(WARNINGS_MARKER) {
            section = Section::Warnings;
            continue;
        }

        let is_item = line.starts_with(ITEM_MARKER);
        if (section == Section::Commands && is_item) || line.starts_with(COMMAND_PREFIX) {
            if let Some(command) = parse_command_line(line, dry_run) {
                commands.push(command);
            }
        } else if section == Section::Warnings && is_item {
            let warning = line.strip_prefix(ITEM_MARKER).unwrap_or(line).trim();
            if !warning.is_empty() {
                warnings.push(warning.to_string());
            }
        }
    }

    if commands.is_empty() {
        commands.push(Command::new(
            format!("# Generated from: {query}"),
            "See AI response for details",
            true,
            dry_run,
        ));
    }

    let requires_auth = commands.iter().any(|c| !c.safe);
    Plan {
        summary,
        commands,
        warnings,
        requires_auth,
        dry_run,
    }
}

/// `- <command> | <description> [| <safe>]`; fewer than two fields is not a command.
fn parse_command_line(line: &str, dry_run: bool) -> Option<Command> {
    let mut fields = line.split('|');
    let command = fields.next()?.trim();
    let description = fields.next()?.trim();
    let safe = !fields.next().is_some_and(|flag| flag.contains("false"));

    let command = command.strip_prefix(ITEM_MARKER).unwrap_or(command).trim();
    Some(Command::new(command, description, safe, dry_run))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "SUMMARY: Restart the api deployment
COMMANDS:
- kubectl get pods -n api | List current pods | true
- kubectl rollout restart deployment api -n api | Rolling restart | false
- just some prose without a separator
WARNINGS:
- Pods will be recreated
-
";

    #[test]
    fn test_parses_commands_and_warnings() {
        let plan = parse_response(RESPONSE, "restart api", true);
        assert_eq!(plan.summary, "Restart the api deployment");
        assert_eq!(plan.commands.len(), 2);
        assert_eq!(plan.commands[0].command, "kubectl get pods -n api");
        assert_eq!(plan.commands[0].description, "List current pods");
        assert!(plan.commands[0].safe);
        assert!(!plan.commands[1].safe);
        assert_eq!(plan.warnings, vec!["Pods will be recreated"]);
        assert!(plan.requires_auth);
        assert!(plan.dry_run);
        assert!(plan.commands.iter().all(|c| c.dry_run));
    }

    #[test]
    fn test_missing_safety_flag_defaults_to_safe() {
        let plan = parse_response("COMMANDS:\n- kubectl get ns | List namespaces", "q", false);
        assert!(plan.commands[0].safe);
        assert!(!plan.commands[0].dry_run);
        assert!(!plan.requires_auth);
    }

    #[test]
    fn test_no_commands_yields_placeholder() {
        let plan = parse_response("I am not sure what you mean.", "do the thing", true);
        assert_eq!(plan.summary, "Execution plan for: do the thing");
        assert_eq!(plan.commands.len(), 1);
        assert_eq!(plan.commands[0].command, "# Generated from: do the thing");
        assert_eq!(plan.commands[0].description, "See AI response for details");
        assert!(plan.commands[0].safe);
    }

    #[test]
    fn test_bare_kubectl_line_outside_block() {
        let plan = parse_response(
            "kubectl scale deployment web --replicas=3 | Scale web | true",
            "scale web",
            true,
        );
        assert_eq!(plan.commands.len(), 1);
        assert_eq!(plan.commands[0].command, "kubectl scale deployment web --replicas=3");
    }

    #[test]
    fn test_dash_lines_in_header_are_ignored() {
        let plan = parse_response("- kubectl get pods | List pods\nCOMMANDS:", "q", true);
        assert_eq!(plan.commands[0].command, "# Generated from: q");
    }

    #[test]
    fn test_sections_can_alternate() {
        let response = "COMMANDS:\n- a | first\nWARNINGS:\n- careful\nCOMMANDS:\n- b | second\nSUMMARY: late summary";
        let plan = parse_response(response, "q", true);
        let commands: Vec<_> = plan.commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, vec!["a", "b"]);
        assert_eq!(plan.warnings, vec!["careful"]);
        assert_eq!(plan.summary, "late summary");
    }

    #[test]
    fn test_command_count_matches_well_formed_lines() {
        let lines = ["- kubectl get pods | a | true", "- no separator here", "- kubectl get svc | b"];
        let response = format!("COMMANDS:\n{}", lines.join("\n"));
        let expected = lines.iter().filter(|l| l.contains('|')).count();
        assert_eq!(parse_response(&response, "q", true).commands.len(), expected);
    }
}
