//! Sample analyzer shipped with the built-in catalog.

use crate::diagnose::{Issue, Severity};
use crate::errors::PluginError;

use super::{AnalysisTarget, Analyzer};

/// Reports one low-severity sample issue per analyzed resource.
#[derive(Debug, Clone, Default)]
pub struct ExampleDetector;

impl ExampleDetector {
    pub const NAME: &'static str = "example-detector";

    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for ExampleDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Example diagnostic plugin that detects sample issues"
    }

    fn analyze(&self, target: &AnalysisTarget<'_>) -> Result<Vec<Issue>, PluginError> {
        let resource = match target {
            AnalysisTarget::Pod(pod) => format!("pod/{}", pod.name),
            AnalysisTarget::Namespace { namespace, .. } => {
                format!("namespace/{}", namespace.unwrap_or("*"))
            }
        };

        Ok(vec![Issue::new(
            Severity::Low,
            "example",
            resource,
            "This is an example issue detected by the plugin",
        )
        .with_detail("plugin", Self::NAME)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::PodDetail;

    #[test]
    fn test_reports_sample_issue_for_pod() {
        let pod = PodDetail {
            name: "api-0".to_string(),
            ..PodDetail::default()
        };
        let issues = ExampleDetector::new()
            .analyze(&AnalysisTarget::Pod(&pod))
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(issues[0].resource, "pod/api-0");
    }

    #[test]
    fn test_all_namespaces_resource_name() {
        let issues = ExampleDetector::new()
            .analyze(&AnalysisTarget::Namespace {
                namespace: None,
                pods: &[],
            })
            .unwrap();
        assert_eq!(issues[0].resource, "namespace/*");
    }
}
