//! Prompt construction for plan generation.

/// Rules and response format sent ahead of every planning request.
pub const PLAN_PREAMBLE: &str = "You are a Kubernetes expert assistant. Your task is to translate natural language queries into safe kubectl commands.

Rules:
1. Always prefer dry-run commands when possible
2. Never suggest commands that delete critical resources without warning
3. Include explanations for each command
4. Warn about potentially dangerous operations
5. Use the namespace provided in context when applicable
6. Suggest RBAC-safe alternatives when possible

Format your response as:
SUMMARY: <brief summary>
COMMANDS:
- <kubectl command> | <description> | <safe: true/false>

WARNINGS:
- <warning if any>
";

const DEFAULT_NAMESPACE: &str = "default";

/// Build the full planning prompt for a query.
pub fn build_prompt(namespace: &str, query: &str) -> String {
    let namespace = if namespace.trim().is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    };

    format!(
        "{PLAN_PREAMBLE}\nNamespace: {namespace}\nQuery: {query}\n\nGenerate a safe execution plan for this query."
    )
}
