//! Configuration for kubectl-pilot.
//!
//! Loaded from a YAML file (`--config`, or `~/.k8s-pilot.yaml` when present),
//! then overridden from the environment. The resulting [`PilotConfig`] is
//! constructed once in `main` and handed to every component that needs it.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{PilotError, PilotResult};

/// Default config file name, looked up in the home directory.
const DEFAULT_CONFIG_FILE: &str = ".k8s-pilot.yaml";

/// Environment variable overrides.
const ENV_AI_PROVIDER: &str = "K8S_PILOT_AI_PROVIDER";
const ENV_AI_KEY: &str = "K8S_PILOT_AI_KEY";
const ENV_AI_MODEL: &str = "K8S_PILOT_AI_MODEL";
const ENV_NAMESPACE: &str = "K8S_PILOT_NAMESPACE";
const ENV_POLICY_ENABLED: &str = "K8S_PILOT_POLICY_ENABLED";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub ai: AiConfig,
    pub kubernetes: KubeConfig,
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
    /// Built-in analyzers to install at startup
    pub plugins: Vec<String>,
}

/// AI provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider identifier: mock, openai, anthropic, ollama
    pub provider: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout for HTTP-backed providers
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            api_key: None,
            model: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

/// Kubernetes connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeConfig {
    /// Kubeconfig context; the current context is used when unset
    pub context: Option<String>,
    pub namespace: String,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            context: None,
            namespace: "default".to_string(),
        }
    }
}

/// Policy gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub enabled: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl PilotConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> PilotResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PilotError::Config {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_yaml(&contents).map_err(|e| PilotError::Config {
            reason: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Parse configuration from YAML text. Missing sections take defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Resolve configuration: explicit path, then `~/.k8s-pilot.yaml`, then
    /// defaults. Environment overrides are applied last.
    pub fn discover(explicit: Option<&Path>) -> PilotResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loading config from home directory");
                    Self::load(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply `K8S_PILOT_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(provider) = non_empty_var(ENV_AI_PROVIDER) {
            self.ai.provider = provider;
        }
        if let Some(key) = non_empty_var(ENV_AI_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = non_empty_var(ENV_AI_MODEL) {
            self.ai.model = Some(model);
        }
        if let Some(namespace) = non_empty_var(ENV_NAMESPACE) {
            self.kubernetes.namespace = namespace;
        }
        if let Some(enabled) = non_empty_var(ENV_POLICY_ENABLED) {
            self.policy.enabled = enabled.eq_ignore_ascii_case("true") || enabled == "1";
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [
            ENV_AI_PROVIDER,
            ENV_AI_KEY,
            ENV_AI_MODEL,
            ENV_NAMESPACE,
            ENV_POLICY_ENABLED,
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = PilotConfig::default();
        assert_eq!(config.ai.provider, "mock");
        assert!((config.ai.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.ai.max_tokens, 2000);
        assert_eq!(config.kubernetes.namespace, "default");
        assert!(!config.policy.enabled);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = PilotConfig::from_yaml(
            "ai:\n  provider: openai\n  model: gpt-4o\npolicy:\n  enabled: true\nplugins:\n  - example-detector\n",
        )
        .unwrap();
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.ai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.ai.max_tokens, 2000);
        assert!(config.policy.enabled);
        assert_eq!(config.kubernetes.namespace, "default");
        assert_eq!(config.plugins, vec!["example-detector".to_string()]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PilotConfig::from_yaml("  \n").unwrap(), PilotConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_file_and_env_override() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "kubernetes:\n  namespace: payments\nlogging:\n  format: json"
        )
        .unwrap();

        env::set_var(ENV_AI_PROVIDER, "anthropic");
        env::set_var(ENV_POLICY_ENABLED, "1");
        let config = PilotConfig::discover(Some(file.path())).unwrap();
        clear_env();

        assert_eq!(config.kubernetes.namespace, "payments");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.ai.provider, "anthropic");
        assert!(config.policy.enabled);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_config_error() {
        clear_env();
        let err = PilotConfig::discover(Some(Path::new("/nonexistent/pilot.yaml"))).unwrap_err();
        assert!(matches!(err, PilotError::Config { .. }));
    }
}
