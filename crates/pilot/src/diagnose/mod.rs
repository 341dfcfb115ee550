//! Diagnostics and health scoring.
//!
//! Pods are inspected (or a namespace scanned), issues are weighted into a
//! 0-100 health score, and remediations are suggested for unhealthy pods.

pub mod engine;
pub mod remediation;
pub mod types;

pub use engine::{inspect_pod, scan_pods, DiagnosticsEngine};
pub use types::{
    clamp_score, issue_types, Confidence, Issue, Remediation, Report, Severity, MAX_HEALTH_SCORE,
};
