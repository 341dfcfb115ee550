//! Shared fakes for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pilot::ai::{AiProvider, GenerateOptions, GenerationResponse};
use pilot::errors::{AiError, PilotError, PilotResult};
use pilot::k8s::{ClusterEvent, ContainerState, ContainerStatus, PodDetail, PodSummary, ResourceQuery};

// =============================================================================
// Cluster
// =============================================================================

/// In-memory cluster holding a fixed set of pods.
#[derive(Default)]
pub struct FakeCluster {
    pub pods: Vec<PodDetail>,
    pub events: Vec<ClusterEvent>,
}

impl FakeCluster {
    pub fn with_pods(pods: Vec<PodDetail>) -> Self {
        Self {
            pods,
            events: Vec::new(),
        }
    }
}

#[async_trait]
impl ResourceQuery for FakeCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> PilotResult<Vec<PodSummary>> {
        Ok(self
            .pods
            .iter()
            .filter(|p| namespace.map_or(true, |ns| p.namespace == ns))
            .map(PodSummary::from_detail)
            .collect())
    }

    async fn get_pod(&self, name: &str, namespace: &str) -> PilotResult<PodDetail> {
        self.pods
            .iter()
            .find(|p| p.name == name && p.namespace == namespace)
            .cloned()
            .ok_or_else(|| PilotError::NotFound {
                kind: "pod".to_string(),
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    async fn get_logs(
        &self,
        pod: &str,
        _container: Option<&str>,
        _namespace: &str,
        _tail_lines: i64,
    ) -> PilotResult<String> {
        Ok(format!("{pod}: started"))
    }

    async fn get_events(&self, _namespace: &str) -> PilotResult<Vec<ClusterEvent>> {
        Ok(self.events.clone())
    }
}

pub fn running_pod(name: &str, namespace: &str) -> PodDetail {
    PodDetail {
        name: name.to_string(),
        namespace: namespace.to_string(),
        phase: "Running".to_string(),
        containers: vec![ContainerStatus {
            name: "app".to_string(),
            image: "app:1.0".to_string(),
            ready: true,
            restart_count: 0,
            state: ContainerState::Running,
        }],
    }
}

pub fn restarting_pod(name: &str, namespace: &str, restarts: i32) -> PodDetail {
    let mut pod = running_pod(name, namespace);
    pod.containers[0].restart_count = restarts;
    pod
}

// =============================================================================
// AI provider
// =============================================================================

/// Provider that always answers with the same text.
pub struct ScriptedProvider {
    pub content: String,
}

impl ScriptedProvider {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        Ok(GenerationResponse {
            content: self.content.clone(),
            model: "scripted".to_string(),
            tokens_used: 0,
            finish_reason: "stop".to_string(),
        })
    }
}

/// Provider that is never reachable.
pub struct DownProvider;

#[async_trait]
impl AiProvider for DownProvider {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        Err(AiError::ProviderUnavailable {
            provider: "down".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
