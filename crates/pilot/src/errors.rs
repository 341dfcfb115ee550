//! Error types for the pilot crate.

use thiserror::Error;

/// Errors raised at the AI provider boundary.
///
/// None of these are fatal: callers decide whether a failed generation aborts
/// the operation (plan generation) or degrades it (remediation suggestions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("{provider} does not implement {operation}")]
    NotImplemented {
        provider: String,
        operation: String,
    },

    #[error("{provider} requires an API key (set {env_var} or ai.api_key)")]
    MissingCredential { provider: String, env_var: String },

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Errors raised by the extension registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin {0} is already registered")]
    AlreadyRegistered(String),

    #[error("plugin {0} is not registered")]
    NotFound(String),

    #[error("unknown plugin: {name} (available: {available})")]
    UnknownPlugin { name: String, available: String },

    #[error("plugin {plugin} analysis failed: {reason}")]
    AnalysisFailed { plugin: String, reason: String },
}

/// Top-level error for plan, diagnose and explain operations.
#[derive(Error, Debug)]
pub enum PilotError {
    #[error("failed to generate plan: {source}")]
    GenerationFailed {
        #[source]
        source: AiError,
    },

    #[error("unsupported resource type: {0}")]
    Unsupported(String),

    #[error("{kind} {name} not found in namespace {namespace}")]
    NotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("kubernetes request failed: {0}")]
    Kubernetes(String),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error("command failed: {command}: {reason}")]
    Execution { command: String, reason: String },
}

impl From<kube::Error> for PilotError {
    fn from(err: kube::Error) -> Self {
        Self::Kubernetes(err.to_string())
    }
}

/// Result type alias for pilot operations
pub type PilotResult<T> = Result<T, PilotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failed_keeps_source() {
        let err = PilotError::GenerationFailed {
            source: AiError::MissingCredential {
                provider: "openai".to_string(),
                env_var: "OPENAI_API_KEY".to_string(),
            },
        };
        assert!(err.to_string().starts_with("failed to generate plan"));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_plugin_error_display() {
        let err = PluginError::AlreadyRegistered("example-detector".to_string());
        assert_eq!(
            err.to_string(),
            "plugin example-detector is already registered"
        );
    }
}
