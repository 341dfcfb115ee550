//! Plan generation pipeline.
//!
//! Natural-language intent is turned into a prompt, sent to the AI provider,
//! parsed into a [`Plan`] and screened by the [`PolicyGate`] before anything is
//! previewed or applied.

pub mod execute;
pub mod parser;
pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::ai::{send, AiProvider, GenerateOptions, GenerationRequest};
use crate::errors::{PilotError, PilotResult};
use crate::policy::{PolicyGate, Violation};

pub use execute::{CommandExecutor, ExecutionResult, RecordingExecutor};
pub use parser::parse_response;
pub use prompt::build_prompt;

/// A single candidate command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub command: String,
    pub description: String,
    pub safe: bool,
    pub dry_run: bool,
    /// False when the policy gate denied this command
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl Command {
    pub fn new(
        command: impl Into<String>,
        description: impl Into<String>,
        safe: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
            safe,
            dry_run,
            allowed: true,
            violations: Vec::new(),
        }
    }

    /// Release this command from dry-run so it executes even in a dry-run plan.
    pub fn force(&mut self) {
        self.dry_run = false;
    }
}

/// A reviewable execution plan. Never has zero commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub summary: String,
    pub commands: Vec<Command>,
    pub warnings: Vec<String>,
    pub requires_auth: bool,
    pub dry_run: bool,
}

impl Plan {
    /// Screen every command through the gate.
    ///
    /// Gate warnings are added to the plan's warnings; denied commands are
    /// marked not allowed. `safe` is left as the model reported it.
    pub fn apply_policy(&mut self, gate: &PolicyGate) {
        for cmd in &mut self.commands {
            let result = gate.validate(&cmd.command);
            self.warnings.extend(
                result
                    .warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", cmd.command)),
            );
            if !result.allowed {
                cmd.allowed = false;
                cmd.violations = result.violations;
            }
        }
        self.requires_auth = self.commands.iter().any(|c| !c.safe || !c.allowed);
    }

    /// Commands the policy gate denied.
    pub fn blocked(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| !c.allowed)
    }

    /// Run the plan's commands in order.
    ///
    /// Denied commands never reach the executor. In a dry-run plan, commands
    /// that were not forced are previewed instead of run. Failures are
    /// collected and execution continues.
    pub async fn execute(&self, executor: &dyn CommandExecutor) -> ExecutionResult {
        let mut result = ExecutionResult::default();

        for cmd in &self.commands {
            if !cmd.allowed {
                result.errors.push(format!("blocked by policy: {}", cmd.command));
                continue;
            }

            if self.dry_run && cmd.dry_run {
                result.executed.push(format!("[DRY-RUN] {}", cmd.command));
                continue;
            }

            match executor.run(&cmd.command).await {
                Ok(()) => result.executed.push(cmd.command.clone()),
                Err(e) => {
                    warn!(command = %cmd.command, error = %e, "Command failed");
                    result.errors.push(e.to_string());
                }
            }
        }

        result
    }
}

/// Turns operator intent into plans.
pub struct Planner {
    provider: Arc<dyn AiProvider>,
    gate: PolicyGate,
    namespace: String,
    dry_run: bool,
    options: GenerateOptions,
}

impl Planner {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        gate: PolicyGate,
        namespace: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            provider,
            gate,
            namespace: namespace.into(),
            dry_run,
            options: GenerateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate a screened plan for a natural-language query.
    #[instrument(skip(self), fields(provider = self.provider.name(), namespace = %self.namespace))]
    pub async fn generate(&self, query: &str) -> PilotResult<Plan> {
        let request = GenerationRequest::new(build_prompt(&self.namespace, query), self.options.clone());
        let response = send(self.provider.as_ref(), &request)
            .await
            .map_err(|source| PilotError::GenerationFailed { source })?;
        debug!(model = %response.model, tokens = response.tokens_used, "Received plan response");

        let mut plan = parse_response(&response.content, query, self.dry_run);
        plan.apply_policy(&self.gate);

        info!(
            commands = plan.commands.len(),
            warnings = plan.warnings.len(),
            blocked = plan.blocked().count(),
            "Generated plan"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::MockAiProvider;
    use crate::ai::{GenerationResponse, MockProvider};
    use crate::errors::AiError;
    use async_trait::async_trait;

    fn responding(content: &'static str) -> Arc<dyn AiProvider> {
        let mut provider = MockAiProvider::new();
        provider.expect_name().return_const("test");
        provider.expect_generate().returning(move |_, _| {
            Ok(GenerationResponse {
                content: content.to_string(),
                model: "test".to_string(),
                tokens_used: 10,
                finish_reason: "stop".to_string(),
            })
        });
        Arc::new(provider)
    }

    struct FailingExecutor;

    #[async_trait]
    impl CommandExecutor for FailingExecutor {
        async fn run(&self, command: &str) -> PilotResult<()> {
            Err(PilotError::Execution {
                command: command.to_string(),
                reason: "exit status 1".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_generate_sends_namespace_and_query() {
        let mut provider = MockAiProvider::new();
        provider.expect_name().return_const("test");
        provider
            .expect_generate()
            .withf(|prompt, _| prompt.contains("Namespace: payments\nQuery: list pods"))
            .times(1)
            .returning(|_, _| {
                Ok(GenerationResponse {
                    content: "COMMANDS:\n- kubectl get pods -n payments | List pods | true".to_string(),
                    model: "test".to_string(),
                    tokens_used: 5,
                    finish_reason: "stop".to_string(),
                })
            });

        let plan = Planner::new(Arc::new(provider), PolicyGate::new(true), "payments", true)
            .generate("list pods")
            .await
            .unwrap();
        assert_eq!(plan.commands[0].command, "kubectl get pods -n payments");
        assert!(!plan.requires_auth);
    }

    #[tokio::test]
    async fn test_provider_error_is_generation_failed() {
        let mut provider = MockAiProvider::new();
        provider.expect_name().return_const("test");
        provider.expect_generate().returning(|_, _| {
            Err(AiError::MissingCredential {
                provider: "openai".to_string(),
                env_var: "OPENAI_API_KEY".to_string(),
            })
        });

        let err = Planner::new(Arc::new(provider), PolicyGate::new(false), "default", true)
            .generate("anything")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PilotError::GenerationFailed {
                source: AiError::MissingCredential { .. }
            }
        ));
        assert!(err.to_string().starts_with("failed to generate plan"));
    }

    #[tokio::test]
    async fn test_gate_blocks_privileged_command() {
        let provider = responding(
            "COMMANDS:\n- kubectl run debug --image=busybox --privileged | Debug pod | true\n- kubectl delete pod api-0 | Remove pod | false",
        );
        let plan = Planner::new(provider, PolicyGate::new(true), "default", true)
            .generate("debug")
            .await
            .unwrap();

        assert!(!plan.commands[0].allowed);
        assert!(plan.commands[0].safe);
        assert_eq!(plan.commands[0].violations[0].policy, "no-privileged-containers");
        assert!(plan.commands[1].allowed);
        assert!(plan
            .warnings
            .contains(&"kubectl delete pod api-0: Potentially dangerous operation detected: delete".to_string()));
        assert!(plan.requires_auth);
        assert_eq!(plan.blocked().count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_restart_plan() {
        let plan = Planner::new(Arc::new(MockProvider::new()), PolicyGate::new(true), "default", true)
            .generate("restart the api pods")
            .await
            .unwrap();
        assert!(!plan.commands.is_empty());
        assert!(plan.dry_run);
    }

    #[tokio::test]
    async fn test_dry_run_previews_commands() {
        let plan = parse_response("COMMANDS:\n- kubectl get pods | List | true", "q", true);
        let executor = RecordingExecutor::new();
        let result = plan.execute(&executor).await;
        assert_eq!(result.executed, vec!["[DRY-RUN] kubectl get pods"]);
        assert!(executor.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_forced_command_runs_in_dry_run_plan() {
        let mut plan = parse_response(
            "COMMANDS:\n- kubectl get pods | List | true\n- kubectl get svc | List | true",
            "q",
            true,
        );
        plan.commands[1].force();
        let executor = RecordingExecutor::new();
        let result = plan.execute(&executor).await;
        assert_eq!(result.executed, vec!["[DRY-RUN] kubectl get pods", "kubectl get svc"]);
        assert_eq!(executor.recorded(), vec!["kubectl get svc"]);
    }

    #[tokio::test]
    async fn test_blocked_commands_never_reach_executor() {
        let mut plan = parse_response(
            "COMMANDS:\n- kubectl run x --privileged | Run | true\n- kubectl get pods | List | true",
            "q",
            false,
        );
        plan.apply_policy(&PolicyGate::new(true));
        let executor = RecordingExecutor::new();
        let result = plan.execute(&executor).await;
        assert_eq!(result.errors, vec!["blocked by policy: kubectl run x --privileged"]);
        assert_eq!(executor.recorded(), vec!["kubectl get pods"]);
    }

    #[tokio::test]
    async fn test_executor_failures_are_collected() {
        let plan = parse_response(
            "COMMANDS:\n- kubectl get pods | List | true\n- kubectl get svc | List | true",
            "q",
            false,
        );
        let result = plan.execute(&FailingExecutor).await;
        assert!(result.executed.is_empty());
        assert_eq!(result.errors.len(), 2);
        assert!(!result.is_success());
    }
}
