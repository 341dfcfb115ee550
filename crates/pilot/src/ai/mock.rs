//! Deterministic offline provider.
//!
//! Picks a canned explanation by keyword so the planner, diagnostics engine and
//! explainer all work without network access.

use async_trait::async_trait;
use serde_json::json;

use crate::errors::AiError;

use super::provider::{AiProvider, GenerateOptions, GenerationResponse};

/// Model identifier reported by the mock backend.
pub const MOCK_MODEL: &str = "mock-v1";

const RESTART_RESPONSE: &str = "To restart pods, I recommend using a rolling restart approach:

1. kubectl rollout restart deployment <deployment-name> -n <namespace>

This will gracefully restart all pods in the deployment without downtime.

Alternative: Delete specific pods to trigger recreation:
kubectl delete pod <pod-name> -n <namespace>

The scheduler will automatically create new pods to replace them.";

const DIAGNOSE_RESPONSE: &str = "Based on the diagnostics:

Issue: CrashLoopBackOff detected
Root Cause: Application is likely failing at startup due to:
  - Missing environment variables
  - Database connection failure
  - Invalid configuration

Recommended Actions:
1. Check logs: kubectl logs <pod-name> -n <namespace>
2. Describe pod: kubectl describe pod <pod-name> -n <namespace>
3. Verify configmaps and secrets are mounted correctly
4. Check resource limits - pod may be OOMKilled";

const SCALE_RESPONSE: &str = "To scale the deployment:

kubectl scale deployment <deployment-name> --replicas=<count> -n <namespace>

This will adjust the number of pod replicas to the specified count.
Use 'kubectl get deployment' to verify the scaling operation.";

/// Mock AI provider for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn canned_response(prompt: &str) -> String {
        let lower = prompt.to_lowercase();

        if lower.contains("restart") && lower.contains("pod") {
            RESTART_RESPONSE.to_string()
        } else if lower.contains("diagnose") || lower.contains("crashloop") {
            DIAGNOSE_RESPONSE.to_string()
        } else if lower.contains("scale") {
            SCALE_RESPONSE.to_string()
        } else {
            format!("Mock AI response for prompt: {prompt}")
        }
    }

    fn canned_plan(prompt: &str) -> serde_json::Value {
        let lower = prompt.to_lowercase();

        let command = if lower.contains("restart") {
            json!({
                "command": "kubectl rollout restart deployment myapp -n default",
                "description": "Restart deployment pods with rolling update",
                "safe": true,
                "dry_run": true,
            })
        } else if lower.contains("scale") {
            json!({
                "command": "kubectl scale deployment myapp --replicas=5 -n default",
                "description": "Scale deployment to 5 replicas",
                "safe": true,
                "dry_run": true,
            })
        } else {
            json!({
                "command": "kubectl get pods -n default",
                "description": "List pods in default namespace",
                "safe": true,
                "dry_run": false,
            })
        };

        json!({
            "summary": "Generated execution plan",
            "commands": [command],
            "warnings": [],
            "requires_confirmation": true,
        })
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        let content = Self::canned_response(prompt);
        let tokens_used = u32::try_from(content.len() / 4).unwrap_or(u32::MAX);

        Ok(GenerationResponse {
            content,
            model: MOCK_MODEL.to_string(),
            tokens_used,
            finish_reason: "stop".to_string(),
        })
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _schema: &serde_json::Value,
        _options: &GenerateOptions,
    ) -> Result<serde_json::Value, AiError> {
        let lower = prompt.to_lowercase();
        if lower.contains("kubectl") || lower.contains("plan") {
            return Ok(Self::canned_plan(prompt));
        }

        Ok(json!({
            "message": "Mock structured response",
            "status": "success",
        }))
    }
}
