//! Diagnostic report types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Health score of a resource with no issues.
pub const MAX_HEALTH_SCORE: i32 = 100;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known issue types. Other types are free-form (pod phase, waiting reason).
pub mod issue_types {
    pub const CRASH_LOOP_BACK_OFF: &str = "CrashLoopBackOff";
    pub const IMAGE_PULL_BACK_OFF: &str = "ImagePullBackOff";
    pub const ERR_IMAGE_PULL: &str = "ErrImagePull";
    pub const UNHEALTHY_POD: &str = "UnhealthyPod";
}

/// A detected issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub issue_type: String,
    pub resource: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        issue_type: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            issue_type: issue_type.into(),
            resource: resource.into(),
            description: description.into(),
            details: HashMap::new(),
        }
    }

    /// Attach a detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// Confidence in a remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

/// A suggested fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    pub title: String,
    pub description: String,
    pub command: String,
    pub confidence: Confidence,
    pub safe: bool,
}

/// Diagnostic report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: String,
    pub issues: Vec<Issue>,
    pub remediations: Vec<Remediation>,
    /// Always within 0..=100
    pub health_score: u8,
}

impl Report {
    /// Build a report, clamping the running score into 0..=100.
    pub fn new(
        summary: impl Into<String>,
        issues: Vec<Issue>,
        remediations: Vec<Remediation>,
        raw_score: i32,
    ) -> Self {
        Self {
            summary: summary.into(),
            issues,
            remediations,
            health_score: clamp_score(raw_score),
        }
    }
}

/// Clamp a running score into the 0..=100 range.
pub fn clamp_score(raw: i32) -> u8 {
    // Value is in 0..=100 after the clamp
    raw.clamp(0, MAX_HEALTH_SCORE) as u8
}
