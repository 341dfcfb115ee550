//! Integration tests for diagnostics scoring and plugin merging.

mod common;

use common::{restarting_pod, running_pod, DownProvider, FakeCluster, ScriptedProvider};
use pilot::diagnose::{DiagnosticsEngine, Severity};
use pilot::errors::PilotError;
use pilot::k8s::{ContainerState, PodDetail};
use pilot::plugins::{ExampleDetector, PluginRegistry};
use std::sync::Arc;

fn engine(pods: Vec<PodDetail>) -> DiagnosticsEngine {
    DiagnosticsEngine::new(
        Arc::new(FakeCluster::with_pods(pods)),
        Arc::new(ScriptedProvider::new("1. kubectl rollout undo deployment api")),
        "shop",
    )
}

#[tokio::test]
async fn test_ten_pods_three_problems_scores_seventy() {
    let mut pods: Vec<PodDetail> = (0..7).map(|i| running_pod(&format!("web-{i}"), "shop")).collect();
    pods.push(restarting_pod("flaky-0", "shop", 4));
    pods.push(restarting_pod("flaky-1", "shop", 10));
    let mut pending = running_pod("pending-0", "shop");
    pending.phase = "Pending".to_string();
    pods.push(pending);

    let report = engine(pods).diagnose("", None).await.unwrap();

    assert_eq!(report.health_score, 70);
    assert_eq!(report.issues.len(), 3);
    assert!(report.issues.iter().all(|i| i.severity == Severity::Medium));
    assert_eq!(
        report.summary,
        "Found 3 issue(s) across 10 pods. Health score: 70/100"
    );
}

#[tokio::test]
async fn test_healthy_pod_has_full_score() {
    let report = engine(vec![running_pod("api", "shop")])
        .diagnose("pod", Some("api"))
        .await
        .unwrap();
    assert!(report.issues.is_empty());
    assert!(report.remediations.is_empty());
    assert_eq!(report.health_score, 100);
}

#[tokio::test]
async fn test_score_is_clamped_for_badly_broken_pod() {
    let mut pod = running_pod("api", "shop");
    pod.phase = "Pending".to_string();
    pod.containers = (0..3)
        .map(|i| {
            let mut c = pod_container(&format!("c{i}"));
            c.state = ContainerState::Waiting {
                reason: "CrashLoopBackOff".to_string(),
                message: "back-off".to_string(),
            };
            c.restart_count = 12;
            c
        })
        .collect();

    let report = engine(vec![pod]).diagnose("pods", Some("api")).await.unwrap();
    assert_eq!(report.health_score, 0);
    assert_eq!(report.issues.len(), 7);
    assert_eq!(report.remediations.len(), 3);
}

fn pod_container(name: &str) -> pilot::k8s::ContainerStatus {
    let mut c = running_pod("x", "shop").containers.remove(0);
    c.name = name.to_string();
    c
}

#[tokio::test]
async fn test_unreachable_provider_degrades_to_no_remediations() {
    let mut pod = running_pod("api", "shop");
    pod.phase = "Failed".to_string();
    let engine = DiagnosticsEngine::new(
        Arc::new(FakeCluster::with_pods(vec![pod])),
        Arc::new(DownProvider),
        "shop",
    );

    let report = engine.diagnose("pod", Some("api")).await.unwrap();
    assert_eq!(report.issues.len(), 1);
    assert!(report.remediations.is_empty());
}

#[tokio::test]
async fn test_missing_pod_and_unsupported_kind() {
    let engine = engine(Vec::new());
    assert!(matches!(
        engine.diagnose("pod", Some("ghost")).await,
        Err(PilotError::NotFound { .. })
    ));
    assert!(matches!(
        engine.diagnose("service", None).await,
        Err(PilotError::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_plugin_issues_follow_core_issues() {
    let registry = Arc::new(PluginRegistry::new());
    registry.install(Arc::new(ExampleDetector::new())).unwrap();

    let pods = vec![running_pod("ok", "shop"), restarting_pod("flaky", "shop", 20)];
    let report = engine(pods)
        .with_plugins(registry)
        .diagnose("", None)
        .await
        .unwrap();

    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.issues[0].severity, Severity::High);
    assert_eq!(report.issues[1].resource, "namespace/shop");
    assert_eq!(report.health_score, 90);
    assert!(report.summary.starts_with("Found 2 issue(s) across 2 pods"));
}
