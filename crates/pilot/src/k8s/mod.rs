//! Resource query interface.
//!
//! The diagnostics engine and explainer only see cluster state through
//! [`ResourceQuery`]; [`KubeResourceQuery`] backs it with the Kubernetes API.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::errors::PilotResult;

pub use client::KubeResourceQuery;
pub use types::{ClusterEvent, ContainerState, ContainerStatus, PodDetail, PodSummary, PHASE_RUNNING};

/// Read-only access to pods, logs and events.
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    /// List pods in a namespace, or across all namespaces when `None`.
    async fn list_pods(&self, namespace: Option<&str>) -> PilotResult<Vec<PodSummary>>;

    /// Fetch a single pod. Missing pods are `PilotError::NotFound`.
    async fn get_pod(&self, name: &str, namespace: &str) -> PilotResult<PodDetail>;

    /// Tail a container's logs. `container` defaults to the pod's only container.
    async fn get_logs(
        &self,
        pod: &str,
        container: Option<&str>,
        namespace: &str,
        tail_lines: i64,
    ) -> PilotResult<String>;

    /// List events in a namespace.
    async fn get_events(&self, namespace: &str) -> PilotResult<Vec<ClusterEvent>>;
}
