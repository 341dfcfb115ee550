//! AI-backed explanations of logs, events and Kubernetes concepts.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::ai::{AiProvider, GenerateOptions};
use crate::errors::{PilotError, PilotResult};
use crate::k8s::ResourceQuery;

/// Log lines fetched for a logs explanation.
const LOG_TAIL_LINES: i64 = 50;
/// Events included in an events explanation.
const MAX_EVENTS: usize = 10;

const LOGS_USAGE: &str = "Please specify a pod name. Example: kubectl-pilot explain logs mypod";

/// An answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub query: String,
    pub answer: String,
    /// `kubectl` lines found in the answer
    pub related_commands: Vec<String>,
    pub tip: String,
}

/// What a query asks about, by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Logs,
    Events,
    Resource,
    Concept,
}

impl Topic {
    pub fn classify(query: &str) -> Self {
        let lower = query.to_lowercase();
        if lower.contains("logs") {
            Self::Logs
        } else if lower.contains("events") {
            Self::Events
        } else if lower.contains("pod") || lower.contains("deployment") {
            Self::Resource
        } else {
            Self::Concept
        }
    }

    fn tip(self, query: &str) -> &'static str {
        match self {
            Self::Logs => "Use -f flag to follow logs in real-time: kubectl logs -f <pod>",
            Self::Events => {
                "Filter events by type with --field-selector: kubectl get events --field-selector type=Warning"
            }
            // "deployment" queries only get the pod tip when they also mention pods
            Self::Resource | Self::Concept if query.to_lowercase().contains("pod") => {
                "Use 'kubectl describe pod' to see detailed information including events"
            }
            Self::Resource | Self::Concept => {
                "Use 'kubectl explain <resource>' to see detailed documentation"
            }
        }
    }
}

/// Answers questions about cluster state and Kubernetes concepts.
///
/// Concept questions only need the AI provider; logs and events questions need
/// a cluster connection set with [`Explainer::with_resources`].
pub struct Explainer {
    resources: Option<Arc<dyn ResourceQuery>>,
    provider: Arc<dyn AiProvider>,
    namespace: String,
    options: GenerateOptions,
}

impl Explainer {
    pub fn new(provider: Arc<dyn AiProvider>, namespace: impl Into<String>) -> Self {
        Self {
            resources: None,
            provider,
            namespace: namespace.into(),
            options: GenerateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_resources(mut self, resources: Arc<dyn ResourceQuery>) -> Self {
        self.resources = Some(resources);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Explain a free-form query.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn explain(&self, query: &str) -> PilotResult<Explanation> {
        let topic = Topic::classify(query);
        debug!(?topic, "Classified query");

        let answer = match topic {
            Topic::Logs => self.explain_logs(query).await?,
            Topic::Events => self.explain_events().await?,
            Topic::Resource => self.ask(&resource_prompt(query)).await?,
            Topic::Concept => self.ask(&concept_prompt(query)).await?,
        };

        Ok(Explanation {
            query: query.to_string(),
            related_commands: extract_commands(&answer),
            tip: topic.tip(query).to_string(),
            answer,
        })
    }

    fn cluster(&self) -> PilotResult<&dyn ResourceQuery> {
        self.resources
            .as_deref()
            .ok_or_else(|| PilotError::Kubernetes("no cluster connection".to_string()))
    }

    async fn ask(&self, prompt: &str) -> PilotResult<String> {
        let response = self.provider.generate(prompt, &self.options).await?;
        Ok(response.content)
    }

    async fn explain_logs(&self, query: &str) -> PilotResult<String> {
        let Some(pod) = pod_after_logs(query) else {
            return Ok(LOGS_USAGE.to_string());
        };

        let logs = match self.cluster() {
            Ok(resources) => {
                resources
                    .get_logs(pod, None, &self.namespace, LOG_TAIL_LINES)
                    .await
            }
            Err(e) => Err(e),
        };
        let logs = match logs {
            Ok(logs) => logs,
            Err(e) => {
                warn!(pod = %pod, error = %e, "Failed to retrieve logs");
                return Ok(format!("Could not retrieve logs: {e}"));
            }
        };

        let prompt = format!(
            "Analyze these Kubernetes pod logs and explain what's happening:\n\n\
             Pod: {pod}\nLogs:\n{logs}\n\n\
             Provide:\n\
             1. A summary of what the application is doing\n\
             2. Any errors or warnings present\n\
             3. Recommendations if issues are found"
        );
        self.ask(&prompt).await
    }

    async fn explain_events(&self) -> PilotResult<String> {
        let events = self.cluster()?.get_events(&self.namespace).await?;

        let mut summary = format!("Recent events in namespace {}:\n\n", self.namespace);
        for event in events.iter().take(MAX_EVENTS) {
            writeln!(
                summary,
                "- [{}] {}: {}",
                event.event_type, event.reason, event.message
            )
            .unwrap();
        }

        let prompt = format!(
            "Analyze these Kubernetes events and explain what they mean:\n\n{summary}\n\n\
             Provide a summary of cluster activity and any issues that need attention."
        );
        self.ask(&prompt).await
    }
}

/// The word following "logs", taken as the pod name.
fn pod_after_logs(query: &str) -> Option<&str> {
    let mut words = query.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case("logs"))?;
    words.next()
}

fn resource_prompt(query: &str) -> String {
    format!(
        "User asked: \"{query}\"\n\n\
         Explain this Kubernetes resource or concept clearly and concisely.\n\
         Include:\n\
         1. What the resource does\n\
         2. Common use cases\n\
         3. Best practices\n\
         4. Example kubectl commands"
    )
}

fn concept_prompt(query: &str) -> String {
    format!(
        "Explain this Kubernetes concept or question:\n\n\"{query}\"\n\n\
         Provide a clear, educational explanation that helps the user understand the concept.\n\
         Include practical examples and kubectl commands where relevant."
    )
}

/// Trimmed lines of `content` that start with `kubectl`.
pub fn extract_commands(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("kubectl"))
        .map(str::to_string)
        .collect()
}
