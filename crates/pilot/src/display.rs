//! Terminal rendering for plans, reports and policy results.

use colored::{ColoredString, Colorize};
use std::fmt::Write as _;

use crate::diagnose::{Report, Severity};
use crate::explain::Explanation;
use crate::plan::{ExecutionResult, Plan};
use crate::plugins::PluginRegistry;
use crate::policy::ValidationResult;

fn severity_label(severity: Severity) -> ColoredString {
    let label = format!("[{}]", severity.as_str().to_uppercase());
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
    }
}

fn health_label(score: u8) -> ColoredString {
    let label = format!("{score}/100");
    match score {
        80..=100 => label.green(),
        50..=79 => label.yellow(),
        _ => label.red(),
    }
}

/// Render a plan for review.
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    writeln!(out, "\n{}\n", plan.summary.bold()).unwrap();

    if !plan.warnings.is_empty() {
        writeln!(out, "{}", "Warnings:".yellow().bold()).unwrap();
        for warning in &plan.warnings {
            writeln!(out, "  • {warning}").unwrap();
        }
        writeln!(out).unwrap();
    }

    writeln!(out, "Commands to execute:").unwrap();
    for (i, cmd) in plan.commands.iter().enumerate() {
        let marker = if !cmd.allowed {
            "✗".red()
        } else if cmd.safe {
            "✓".green()
        } else {
            "⚠".yellow()
        };
        writeln!(out, "\n{}. [{marker}] {}", i + 1, cmd.description).unwrap();
        writeln!(out, "   {}", cmd.command.cyan()).unwrap();
        for violation in &cmd.violations {
            writeln!(
                out,
                "   {} {} ({})",
                "blocked:".red(),
                violation.message,
                violation.policy
            )
            .unwrap();
        }
    }

    if plan.requires_auth {
        writeln!(out, "\n{}", "This plan contains commands that need review before applying.".yellow()).unwrap();
    }
    if plan.dry_run {
        writeln!(out, "\n(Dry-run mode - no changes will be applied)").unwrap();
    }
    out
}

/// Render the outcome of executing a plan.
pub fn render_execution(result: &ExecutionResult) -> String {
    let mut out = String::new();
    writeln!(out, "\nExecuted commands:").unwrap();
    for (i, cmd) in result.executed.iter().enumerate() {
        writeln!(out, "{}. {cmd}", i + 1).unwrap();
    }

    if !result.errors.is_empty() {
        writeln!(out, "\n{}", "Errors encountered:".red().bold()).unwrap();
        for err in &result.errors {
            writeln!(out, "  ✗ {err}").unwrap();
        }
    }
    out
}

/// Render a diagnostic report.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    writeln!(out, "\n{}", report.summary.bold()).unwrap();
    writeln!(out, "Health Score: {}\n", health_label(report.health_score)).unwrap();

    if report.issues.is_empty() {
        writeln!(out, "{}", "✓ No issues detected!".green()).unwrap();
        return out;
    }

    writeln!(out, "Issues found:").unwrap();
    for (i, issue) in report.issues.iter().enumerate() {
        writeln!(
            out,
            "{}. {} {} ({})",
            i + 1,
            severity_label(issue.severity),
            issue.description,
            issue.resource
        )
        .unwrap();
    }

    if !report.remediations.is_empty() {
        writeln!(out, "\nSuggested remediations:").unwrap();
        for (i, step) in report.remediations.iter().enumerate() {
            writeln!(
                out,
                "\n{}. {} [confidence: {}]",
                i + 1,
                step.title.bold(),
                step.confidence
            )
            .unwrap();
            writeln!(out, "   {}", step.description).unwrap();
            writeln!(out, "   {}", step.command.cyan()).unwrap();
        }
    }
    out
}

/// Render an explanation.
pub fn render_explanation(explanation: &Explanation) -> String {
    let mut out = String::new();
    writeln!(out, "\nQuery: {}\n", explanation.query.bold()).unwrap();
    writeln!(out, "{}", explanation.answer).unwrap();

    if !explanation.related_commands.is_empty() {
        writeln!(out, "\nRelated commands:").unwrap();
        for cmd in &explanation.related_commands {
            writeln!(out, "  {}", cmd.cyan()).unwrap();
        }
    }
    writeln!(out, "\n{} {}", "Tip:".green().bold(), explanation.tip).unwrap();
    out
}

/// Render a policy check of a single command.
pub fn render_validation(command: &str, result: &ValidationResult) -> String {
    let mut out = String::new();
    let verdict = if result.allowed {
        "ALLOWED".green().bold()
    } else {
        "DENIED".red().bold()
    };
    writeln!(out, "{verdict}: {command}").unwrap();

    for violation in &result.violations {
        writeln!(
            out,
            "  ✗ [{}] {}: {}",
            violation.severity.as_str(),
            violation.policy,
            violation.message
        )
        .unwrap();
    }
    for warning in &result.warnings {
        writeln!(out, "  ⚠ {warning}").unwrap();
    }
    out
}

/// Render the installed analyzers.
pub fn render_plugins(registry: &PluginRegistry) -> String {
    let mut plugins = registry.list();
    if plugins.is_empty() {
        return "No plugins installed\n".to_string();
    }
    plugins.sort_by(|a, b| a.name().cmp(b.name()));

    let mut out = String::new();
    writeln!(out, "Installed plugins ({}):", plugins.len()).unwrap();
    for plugin in plugins {
        writeln!(
            out,
            "  - {} v{}: {}",
            plugin.name().bold(),
            plugin.version(),
            plugin.description()
        )
        .unwrap();
    }
    out
}
