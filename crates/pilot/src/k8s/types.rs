//! Plain-data views of cluster resources.

use serde::{Deserialize, Serialize};

/// Phase reported by a healthy pod.
pub const PHASE_RUNNING: &str = "Running";

/// Pod summary used by namespace scans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSummary {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    /// True when every container reports ready
    pub ready: bool,
    /// Sum of container restart counts
    pub restarts: i32,
    pub containers: Vec<ContainerStatus>,
}

impl PodSummary {
    /// Summarize a detailed pod view.
    pub fn from_detail(pod: &PodDetail) -> Self {
        Self {
            name: pod.name.clone(),
            namespace: pod.namespace.clone(),
            phase: pod.phase.clone(),
            ready: pod.containers.iter().all(|c| c.ready),
            restarts: pod.containers.iter().map(|c| c.restart_count).sum(),
            containers: pod.containers.clone(),
        }
    }
}

/// Detailed pod view used by single-pod inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodDetail {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub containers: Vec<ContainerStatus>,
}

/// Container status within a pod
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub image: String,
    pub ready: bool,
    pub restart_count: i32,
    pub state: ContainerState,
}

impl ContainerStatus {
    /// Waiting reason and message, when the container is waiting.
    pub fn waiting(&self) -> Option<(&str, &str)> {
        match &self.state {
            ContainerState::Waiting { reason, message } => Some((reason, message)),
            _ => None,
        }
    }
}

/// Container state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ContainerState {
    Waiting { reason: String, message: String },
    #[default]
    Running,
    Terminated { exit_code: i32, reason: String },
}

/// A cluster event as shown by `kubectl get events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEvent {
    /// Normal or Warning
    pub event_type: String,
    pub reason: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str, ready: bool, restarts: i32) -> ContainerStatus {
        ContainerStatus {
            name: name.to_string(),
            ready,
            restart_count: restarts,
            ..ContainerStatus::default()
        }
    }

    #[test]
    fn test_summary_aggregates_containers() {
        let pod = PodDetail {
            name: "api-7b9f8c6d5-abc12".to_string(),
            namespace: "payments".to_string(),
            phase: PHASE_RUNNING.to_string(),
            containers: vec![container("app", true, 2), container("sidecar", false, 3)],
        };
        let summary = PodSummary::from_detail(&pod);
        assert!(!summary.ready);
        assert_eq!(summary.restarts, 5);
        assert_eq!(summary.containers.len(), 2);
    }

    #[test]
    fn test_default_container_is_running() {
        let status = ContainerStatus::default();
        assert_eq!(status.state, ContainerState::Running);
        assert!(status.waiting().is_none());
    }

    #[test]
    fn test_waiting_accessor() {
        let mut status = container("app", false, 0);
        assert!(status.waiting().is_none());
        status.state = ContainerState::Waiting {
            reason: "CrashLoopBackOff".to_string(),
            message: "back-off 5m0s".to_string(),
        };
        assert_eq!(status.waiting(), Some(("CrashLoopBackOff", "back-off 5m0s")));
    }
}
