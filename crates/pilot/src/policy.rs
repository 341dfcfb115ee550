//! Policy gate for generated commands.
//!
//! Commands (and rendered manifests) are screened against a prioritized list of
//! predicate → effect rules over lowercased text. Warnings never deny; any
//! violation does.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    High,
    Medium,
    Low,
}

impl ViolationSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A policy violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub policy: String,
    pub severity: ViolationSeverity,
    pub message: String,
}

/// Result of a policy validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub allowed: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn allow_all() -> Self {
        Self {
            allowed: true,
            violations: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Condition over normalized (lowercased) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Any of the markers is present
    ContainsAny(Vec<String>),
    /// `present` is present and `absent` is not
    ContainsWithout { present: String, absent: String },
}

impl Predicate {
    pub fn contains_any<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::ContainsAny(
            markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .collect(),
        )
    }

    pub fn contains_without(present: &str, absent: &str) -> Self {
        Self::ContainsWithout {
            present: present.to_lowercase(),
            absent: absent.to_lowercase(),
        }
    }

    fn matches(&self, normalized: &str) -> bool {
        match self {
            Self::ContainsAny(markers) => markers.iter().any(|m| normalized.contains(m.as_str())),
            Self::ContainsWithout { present, absent } => {
                normalized.contains(present.as_str()) && !normalized.contains(absent.as_str())
            }
        }
    }
}

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Non-blocking warning
    Warn(String),
    /// Blocking violation
    Deny {
        severity: ViolationSeverity,
        message: String,
    },
}

/// A single policy rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub name: String,
    /// Lower runs first
    pub priority: u8,
    pub predicate: Predicate,
    pub effect: Effect,
}

impl PolicyRule {
    pub fn warn(name: &str, priority: u8, predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            priority,
            predicate,
            effect: Effect::Warn(message.into()),
        }
    }

    pub fn deny(
        name: &str,
        priority: u8,
        predicate: Predicate,
        severity: ViolationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            priority,
            predicate,
            effect: Effect::Deny {
                severity,
                message: message.into(),
            },
        }
    }
}

/// Operations that warrant a warning but are not blocked.
const DANGEROUS_OPERATIONS: &[&str] = &["delete", "drain", "cordon"];

/// The built-in rule set.
pub fn default_rules() -> Vec<PolicyRule> {
    let mut rules: Vec<PolicyRule> = DANGEROUS_OPERATIONS
        .iter()
        .map(|op| {
            PolicyRule::warn(
                &format!("dangerous-{op}"),
                10,
                Predicate::contains_any([op]),
                format!("Potentially dangerous operation detected: {op}"),
            )
        })
        .collect();

    rules.push(PolicyRule::deny(
        "no-privileged-containers",
        20,
        Predicate::contains_any(["privileged", "hostNetwork"]),
        ViolationSeverity::High,
        "Privileged containers are not allowed",
    ));
    rules.push(PolicyRule::deny(
        "no-root-containers",
        20,
        Predicate::contains_any(["runAsUser: 0"]),
        ViolationSeverity::High,
        "Running containers as root is not allowed",
    ));
    rules.push(PolicyRule::warn(
        "require-resource-limits",
        30,
        Predicate::contains_without("create", "limits"),
        "No resource limits specified - consider adding limits",
    ));

    rules
}

/// Screens command text before it is previewed or applied.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    enabled: bool,
    rules: Vec<PolicyRule>,
}

impl PolicyGate {
    /// Gate with the built-in rule set.
    pub fn new(enabled: bool) -> Self {
        Self::with_rules(enabled, default_rules())
    }

    /// Gate with a custom rule set. Rules are evaluated by ascending priority,
    /// ties keeping their given order.
    pub fn with_rules(enabled: bool, mut rules: Vec<PolicyRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { enabled, rules }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Validate a command line.
    pub fn validate(&self, command: &str) -> ValidationResult {
        if !self.enabled {
            return ValidationResult::allow_all();
        }

        let normalized = command.to_lowercase();
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        for rule in &self.rules {
            if !rule.predicate.matches(&normalized) {
                continue;
            }
            debug!(rule = %rule.name, "Policy rule matched");
            match &rule.effect {
                Effect::Warn(message) => warnings.push(message.clone()),
                Effect::Deny { severity, message } => violations.push(Violation {
                    policy: rule.name.clone(),
                    severity: *severity,
                    message: message.clone(),
                }),
            }
        }

        if !violations.is_empty() {
            warn!(
                command = %command,
                violations = violations.len(),
                "Command denied by policy"
            );
        }

        ValidationResult {
            allowed: violations.is_empty(),
            violations,
            warnings,
        }
    }

    /// Validate a resource manifest by running the rules over its YAML rendering.
    pub fn validate_resource(
        &self,
        kind: &str,
        name: &str,
        spec: &serde_json::Value,
    ) -> ValidationResult {
        let rendered = match serde_yaml::to_string(spec) {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!(kind, name, error = %e, "Failed to render manifest, checking JSON text");
                spec.to_string()
            }
        };
        self.validate(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gate() -> PolicyGate {
        PolicyGate::new(true)
    }

    #[test]
    fn test_disabled_gate_allows_everything() {
        let result = PolicyGate::new(false).validate("kubectl run x --privileged");
        assert!(result.allowed);
        assert!(result.violations.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_privileged_is_denied() {
        let result = gate().validate("kubectl run debug --image=busybox --privileged");
        assert!(!result.allowed);
        assert_eq!(result.violations[0].policy, "no-privileged-containers");
        assert_eq!(result.violations[0].severity, ViolationSeverity::High);
    }

    #[test]
    fn test_host_network_is_case_insensitive() {
        let result = gate().validate("kubectl patch pod x -p '{\"spec\":{\"HOSTNETWORK\":true}}'");
        assert!(!result.allowed);
    }

    #[test]
    fn test_delete_only_warns() {
        let result = gate().validate("kubectl delete pod api-0 -n payments");
        assert!(result.allowed);
        assert!(result.violations.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Potentially dangerous operation detected: delete".to_string()]
        );
    }

    #[test]
    fn test_checks_are_cumulative() {
        let result = gate().validate("kubectl drain node-1 && kubectl cordon node-1");
        assert_eq!(result.warnings.len(), 2);
        assert!(result.allowed);

        let result = gate().validate("kubectl create deployment x --privileged runAsUser: 0");
        assert_eq!(result.violations.len(), 2);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No resource limits")));
    }

    #[test]
    fn test_create_with_limits_has_no_limit_warning() {
        let result = gate().validate("kubectl create -f app.yaml # limits set");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_allowed_iff_no_violations() {
        for cmd in [
            "kubectl get pods",
            "kubectl delete ns test",
            "privileged",
            "runAsUser: 0",
            "kubectl create ns demo",
        ] {
            let result = gate().validate(cmd);
            assert_eq!(result.allowed, result.violations.is_empty(), "{cmd}");
        }
    }

    #[test]
    fn test_custom_rules_are_sorted_by_priority() {
        let gate = PolicyGate::with_rules(
            true,
            vec![
                PolicyRule::warn("late", 50, Predicate::contains_any(["get"]), "second"),
                PolicyRule::warn("early", 1, Predicate::contains_any(["get"]), "first"),
            ],
        );
        assert_eq!(gate.rules()[0].name, "early");
        assert_eq!(gate.validate("kubectl get pods").warnings, vec!["first", "second"]);
    }

    #[test]
    fn test_validate_resource_catches_root_user() {
        let spec = json!({
            "containers": [{
                "name": "app",
                "securityContext": {"runAsUser": 0}
            }]
        });
        let result = gate().validate_resource("Pod", "app", &spec);
        assert!(!result.allowed);
        assert_eq!(result.violations[0].policy, "no-root-containers");
    }
}
