//! AI Provider trait and common types.
//!
//! Defines the interface that all AI backends must implement, and the factory
//! that selects one from configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::AiConfig;
use crate::errors::AiError;

use super::anthropic::AnthropicProvider;
use super::mock::MockProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;

/// Options for text generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Model override; empty means the provider's configured model
    pub model: String,
    /// System prompt; empty means none
    pub system_prompt: String,
    /// Stop sequences
    pub stop_sequences: Vec<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            model: String::new(),
            system_prompt: String::new(),
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerateOptions {
    /// Options seeded from the configured temperature and token budget.
    pub fn from_config(config: &AiConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            ..Self::default()
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub options: GenerateOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }
}

/// Response from an AI backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text content
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Tokens consumed by the call
    pub tokens_used: u32,
    /// Why generation stopped (stop, length, ...)
    pub finish_reason: String,
}

/// Trait for AI providers.
///
/// `NotImplemented` and `MissingCredential` are ordinary failures of a call,
/// not the absence of a provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider identifier (e.g. "mock", "openai").
    fn name(&self) -> &'static str;

    /// Generate free text for a prompt.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError>;

    /// Generate a structured (JSON) value for a prompt.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
        options: &GenerateOptions,
    ) -> Result<serde_json::Value, AiError> {
        let _ = (prompt, schema, options);
        Err(AiError::NotImplemented {
            provider: self.name().to_string(),
            operation: "structured generation".to_string(),
        })
    }
}

/// Run a [`GenerationRequest`] against a provider.
pub async fn send(
    provider: &dyn AiProvider,
    request: &GenerationRequest,
) -> Result<GenerationResponse, AiError> {
    provider.generate(&request.prompt, &request.options).await
}

/// Known provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Ollama,
    Mock,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(AiError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Create the provider selected by `config.provider`.
pub fn create_provider(config: &AiConfig) -> Result<Arc<dyn AiProvider>, AiError> {
    let provider: Arc<dyn AiProvider> = match config.provider.parse::<ProviderKind>()? {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::from_config(config)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::from_config(config)?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::from_config(config)?),
        ProviderKind::Mock => Arc::new(MockProvider::new()),
    };
    Ok(provider)
}

/// Strip markdown code fences that models like to wrap JSON in.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = text.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        text
    }
}

/// Build a shared HTTP client with the configured timeout.
pub(crate) fn http_client(provider: &str, config: &AiConfig) -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AiError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: format!("failed to build HTTP client: {e}"),
        })
}
