//! Kubernetes-backed [`ResourceQuery`].

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ContainerStatus as K8sContainerStatus, Event, Pod};
use kube::api::{ListParams, LogParams};
use kube::config::KubeConfigOptions;
use kube::{Api, Client};
use tracing::{debug, info};

use crate::config::KubeConfig;
use crate::errors::{PilotError, PilotResult};

use super::types::{ClusterEvent, ContainerState, ContainerStatus, PodDetail, PodSummary};
use super::ResourceQuery;

/// Resource queries against a live cluster.
#[derive(Clone)]
pub struct KubeResourceQuery {
    client: Client,
}

impl KubeResourceQuery {
    /// Connect using in-cluster config or the local kubeconfig, honouring an
    /// explicit context when one is configured.
    pub async fn connect(config: &KubeConfig) -> PilotResult<Self> {
        let client = match &config.context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..KubeConfigOptions::default()
                };
                let kube_config = kube::Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| PilotError::Kubernetes(format!("kubeconfig: {e}")))?;
                Client::try_from(kube_config)?
            }
            None => Client::try_default().await?,
        };

        info!(context = ?config.context, "Connected to Kubernetes");
        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceQuery for KubeResourceQuery {
    async fn list_pods(&self, namespace: Option<&str>) -> PilotResult<Vec<PodSummary>> {
        let pods: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let list = pods.list(&ListParams::default()).await?;
        debug!(namespace = ?namespace, count = list.items.len(), "Listed pods");

        Ok(list
            .items
            .iter()
            .map(|pod| PodSummary::from_detail(&pod_detail(pod)))
            .collect())
    }

    async fn get_pod(&self, name: &str, namespace: &str) -> PilotResult<PodDetail> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        match pods.get(name).await {
            Ok(pod) => Ok(pod_detail(&pod)),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(PilotError::NotFound {
                kind: "pod".to_string(),
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_logs(
        &self,
        pod: &str,
        container: Option<&str>,
        namespace: &str,
        tail_lines: i64,
    ) -> PilotResult<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: container.map(str::to_string),
            tail_lines: (tail_lines > 0).then_some(tail_lines),
            ..LogParams::default()
        };
        Ok(pods.logs(pod, &params).await?)
    }

    async fn get_events(&self, namespace: &str) -> PilotResult<Vec<ClusterEvent>> {
        let events: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let list = events.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .map(|event| ClusterEvent {
                event_type: event.type_.unwrap_or_default(),
                reason: event.reason.unwrap_or_default(),
                message: event.message.unwrap_or_default(),
            })
            .collect())
    }
}

/// Convert an API pod into the plain-data view.
pub(crate) fn pod_detail(pod: &Pod) -> PodDetail {
    let status = pod.status.as_ref();

    PodDetail {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        containers: status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| statuses.iter().map(container_status).collect())
            .unwrap_or_default(),
    }
}

fn container_status(cs: &K8sContainerStatus) -> ContainerStatus {
    let state = cs.state.as_ref();

    let state = if let Some(waiting) = state.and_then(|s| s.waiting.as_ref()) {
        ContainerState::Waiting {
            reason: waiting.reason.clone().unwrap_or_default(),
            message: waiting.message.clone().unwrap_or_default(),
        }
    } else if let Some(terminated) = state.and_then(|s| s.terminated.as_ref()) {
        ContainerState::Terminated {
            exit_code: terminated.exit_code,
            reason: terminated.reason.clone().unwrap_or_default(),
        }
    } else {
        ContainerState::Running
    };

    ContainerStatus {
        name: cs.name.clone(),
        image: cs.image.clone(),
        ready: cs.ready,
        restart_count: cs.restart_count,
        state,
    }
}
