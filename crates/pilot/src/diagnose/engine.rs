//! Diagnostics engine: resource state to scored report.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::ai::{AiProvider, GenerateOptions};
use crate::errors::{PilotError, PilotResult};
use crate::k8s::{PodDetail, PodSummary, ResourceQuery, PHASE_RUNNING};
use crate::plugins::{AnalysisTarget, PluginRegistry};

use super::remediation;
use super::types::{issue_types, Issue, Remediation, Report, Severity, MAX_HEALTH_SCORE};

const PHASE_PENALTY: i32 = 30;
const CRASH_LOOP_PENALTY: i32 = 40;
const IMAGE_PULL_PENALTY: i32 = 35;
const WAITING_PENALTY: i32 = 20;
const RESTART_PENALTY: i32 = 15;
const PROBLEM_POD_PENALTY: i32 = 10;

/// Container restarts above this add a restart issue to a pod inspection.
const POD_RESTART_THRESHOLD: i32 = 5;
/// Pod restarts above this mark a pod as a problem in a namespace scan.
const SCAN_RESTART_THRESHOLD: i32 = 3;
/// Pod restarts above this raise a scan issue to high severity.
const SCAN_HIGH_RESTART_THRESHOLD: i32 = 10;

/// Scans live resource state and scores it.
pub struct DiagnosticsEngine {
    resources: Arc<dyn ResourceQuery>,
    provider: Arc<dyn AiProvider>,
    namespace: String,
    all_namespaces: bool,
    plugins: Option<Arc<PluginRegistry>>,
    options: GenerateOptions,
}

impl DiagnosticsEngine {
    pub fn new(
        resources: Arc<dyn ResourceQuery>,
        provider: Arc<dyn AiProvider>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            resources,
            provider,
            namespace: namespace.into(),
            all_namespaces: false,
            plugins: None,
            options: GenerateOptions::default(),
        }
    }

    /// Scan every namespace instead of the configured one.
    #[must_use]
    pub fn all_namespaces(mut self, all: bool) -> Self {
        self.all_namespaces = all;
        self
    }

    /// Append issues from the registry's analyzers to every report.
    #[must_use]
    pub fn with_plugins(mut self, plugins: Arc<PluginRegistry>) -> Self {
        self.plugins = Some(plugins);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Diagnose a resource kind, optionally by name.
    ///
    /// `pod`/`pods` with a name inspects that pod. An empty kind scans the
    /// namespace and ignores any name, as does `pod`/`pods` without a name.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn diagnose(&self, kind: &str, name: Option<&str>) -> PilotResult<Report> {
        let kind = kind.trim().to_lowercase();
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        match (kind.as_str(), name) {
            ("pod" | "pods", Some(name)) => self.diagnose_pod(name).await,
            ("", _) | ("pod" | "pods", None) => self.scan_namespace().await,
            (other, _) => Err(PilotError::Unsupported(other.to_string())),
        }
    }

    async fn diagnose_pod(&self, name: &str) -> PilotResult<Report> {
        let pod = self.resources.get_pod(name, &self.namespace).await?;
        let (mut issues, score) = inspect_pod(&pod);
        info!(pod = %name, issues = issues.len(), score, "Inspected pod");

        let remediations = if issues.is_empty() {
            Vec::new()
        } else {
            self.remediations(name, &issues).await
        };

        if let Some(plugins) = &self.plugins {
            issues.extend(plugins.run_analysis(&AnalysisTarget::Pod(&pod)));
        }

        Ok(Report::new(
            format!("Diagnostics for pod: {name}"),
            issues,
            remediations,
            score,
        ))
    }

    async fn scan_namespace(&self) -> PilotResult<Report> {
        let namespace = (!self.all_namespaces).then_some(self.namespace.as_str());
        let pods = self.resources.list_pods(namespace).await?;
        let (mut issues, score) = scan_pods(&pods);
        info!(pods = pods.len(), problems = issues.len(), score, "Scanned pods");

        if let Some(plugins) = &self.plugins {
            issues.extend(plugins.run_analysis(&AnalysisTarget::Namespace {
                namespace,
                pods: &pods,
            }));
        }

        let report = Report::new(String::new(), issues, Vec::new(), score);
        Ok(Report {
            summary: format!(
                "Found {} issue(s) across {} pods. Health score: {}/100",
                report.issues.len(),
                pods.len(),
                report.health_score
            ),
            ..report
        })
    }

    /// Canned steps plus one AI suggestion. Provider failures yield none.
    async fn remediations(&self, pod: &str, issues: &[Issue]) -> Vec<Remediation> {
        let prompt = remediation::build_prompt(pod, issues);
        match self.provider.generate(&prompt, &self.options).await {
            Ok(response) => {
                debug!(tokens = response.tokens_used, "Received remediation suggestions");
                let mut steps = remediation::canned(pod, &self.namespace);
                steps.push(remediation::from_ai_response(&response.content));
                steps
            }
            Err(e) => {
                warn!(pod = %pod, error = %e, "Failed to generate remediations");
                Vec::new()
            }
        }
    }
}

/// Score a single pod. Returns the issues and the unclamped score.
pub fn inspect_pod(pod: &PodDetail) -> (Vec<Issue>, i32) {
    let mut issues = Vec::new();
    let mut score = MAX_HEALTH_SCORE;

    if pod.phase != PHASE_RUNNING {
        issues.push(Issue::new(
            Severity::High,
            pod.phase.clone(),
            pod.name.clone(),
            format!("Pod is in {} phase", pod.phase),
        ));
        score -= PHASE_PENALTY;
    }

    for container in &pod.containers {
        let resource = format!("{}/{}", pod.name, container.name);

        if let Some((reason, message)) = container.waiting() {
            let (severity, issue_type, penalty) = match reason {
                issue_types::CRASH_LOOP_BACK_OFF => {
                    (Severity::Critical, issue_types::CRASH_LOOP_BACK_OFF, CRASH_LOOP_PENALTY)
                }
                issue_types::IMAGE_PULL_BACK_OFF | issue_types::ERR_IMAGE_PULL => {
                    (Severity::High, issue_types::IMAGE_PULL_BACK_OFF, IMAGE_PULL_PENALTY)
                }
                other => (Severity::Medium, other, WAITING_PENALTY),
            };
            issues.push(Issue::new(
                severity,
                issue_type,
                resource.clone(),
                format!("Container {}: {reason} - {message}", container.name),
            ));
            score -= penalty;
        }

        // A crash-looping container usually also trips this check, so one
        // failure can be deducted twice.
        if container.restart_count > POD_RESTART_THRESHOLD {
            issues.push(Issue::new(
                Severity::Medium,
                issue_types::CRASH_LOOP_BACK_OFF,
                resource,
                format!("Container has restarted {} times", container.restart_count),
            ));
            score -= RESTART_PENALTY;
        }
    }

    (issues, score)
}

/// Score a pod listing. Returns one issue per problem pod and the unclamped score.
pub fn scan_pods(pods: &[PodSummary]) -> (Vec<Issue>, i32) {
    let issues: Vec<Issue> = pods
        .iter()
        .filter(|pod| {
            pod.phase != PHASE_RUNNING || !pod.ready || pod.restarts > SCAN_RESTART_THRESHOLD
        })
        .map(|pod| {
            let severity = if pod.restarts > SCAN_HIGH_RESTART_THRESHOLD {
                Severity::High
            } else {
                Severity::Medium
            };
            Issue::new(
                severity,
                issue_types::UNHEALTHY_POD,
                format!("pod/{}", pod.name),
                format!(
                    "Pod {}: Phase={}, Ready={}, Restarts={}",
                    pod.name, pod.phase, pod.ready, pod.restarts
                ),
            )
            .with_detail("phase", &pod.phase)
            .with_detail("ready", pod.ready)
            .with_detail("restarts", pod.restarts)
        })
        .collect();

    let problems = i32::try_from(issues.len()).unwrap_or(i32::MAX);
    let score = MAX_HEALTH_SCORE.saturating_sub(problems.saturating_mul(PROBLEM_POD_PENALTY));
    (issues, score)
}
