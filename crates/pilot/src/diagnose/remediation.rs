//! Remediation suggestions for diagnosed pods.

use std::fmt::Write as _;

use super::types::{Confidence, Issue, Remediation};

/// Characters of the AI response kept in the remediation title.
const AI_TITLE_CHARS: usize = 50;

/// Prompt asking the AI for remediation steps for a set of issues.
pub fn build_prompt(resource: &str, issues: &[Issue]) -> String {
    let mut prompt = format!("Kubernetes diagnostics for resource: {resource}\n\nDetected issues:\n");
    for issue in issues {
        writeln!(
            prompt,
            "- [{}] {}: {}",
            issue.severity, issue.issue_type, issue.description
        )
        .unwrap();
    }
    prompt.push_str("\nProvide 3 remediation steps with kubectl commands.");
    prompt
}

/// The fixed log/describe steps suggested for any pod with issues.
pub fn canned(pod: &str, namespace: &str) -> Vec<Remediation> {
    vec![
        Remediation {
            title: "Check pod logs".to_string(),
            description: "Inspect pod logs for error messages".to_string(),
            command: format!("kubectl logs {pod} -n {namespace}"),
            confidence: Confidence::High,
            safe: true,
        },
        Remediation {
            title: "Describe pod".to_string(),
            description: "Get detailed pod information and events".to_string(),
            command: format!("kubectl describe pod {pod} -n {namespace}"),
            confidence: Confidence::High,
            safe: true,
        },
    ]
}

/// Wrap an AI answer as a remediation entry.
///
/// The answer itself is not parsed into commands; only its opening is shown.
pub fn from_ai_response(content: &str) -> Remediation {
    let head: String = content.chars().take(AI_TITLE_CHARS).collect();
    Remediation {
        title: format!("{head}..."),
        description: "AI-suggested remediation".to_string(),
        command: "# See AI response for details".to_string(),
        confidence: Confidence::Medium,
        safe: true,
    }
}
