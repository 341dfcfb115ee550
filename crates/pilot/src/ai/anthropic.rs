//! Anthropic messages API provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::errors::AiError;

use super::provider::{http_client, AiProvider, GenerateOptions, GenerationResponse};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Environment variable consulted when no key is configured
const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Default model
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const PROVIDER: &str = "anthropic";

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// Create a provider from configuration, falling back to `ANTHROPIC_API_KEY`.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(ANTHROPIC_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AiError::MissingCredential {
                provider: PROVIDER.to_string(),
                env_var: ANTHROPIC_KEY_ENV.to_string(),
            })?;

        Ok(Self {
            client: http_client(PROVIDER, config)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

fn unavailable(reason: String) -> AiError {
    AiError::ProviderUnavailable {
        provider: PROVIDER.to_string(),
        reason,
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        let request = MessagesRequest {
            model: if options.model.is_empty() {
                self.model.clone()
            } else {
                options.model.clone()
            },
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system: (!options.system_prompt.is_empty()).then(|| options.system_prompt.clone()),
            stop_sequences: options.stop_sequences.clone(),
        };

        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));
        debug!(model = %request.model, "Sending Anthropic messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| unavailable(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| format!("{}: {}", e.error.error_type, e.error.message))
                .unwrap_or(body);
            return Err(unavailable(format!("API error ({status}): {reason}")));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let content = parsed
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(GenerationResponse {
            content,
            model: parsed.model,
            tokens_used: parsed.usage.input_tokens + parsed.usage.output_tokens,
            finish_reason: parsed.stop_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }
}
