//! OpenAI chat-completions provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::errors::AiError;

use super::provider::{
    http_client, strip_code_fence, AiProvider, GenerateOptions, GenerationResponse,
};

/// OpenAI API base URL
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Environment variable consulted when no key is configured
const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default model
const DEFAULT_MODEL: &str = "gpt-4";

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    /// Create a provider from configuration, falling back to `OPENAI_API_KEY`.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AiError::MissingCredential {
                provider: PROVIDER.to_string(),
                env_var: OPENAI_KEY_ENV.to_string(),
            })?;

        Ok(Self {
            client: http_client(PROVIDER, config)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn build_request(&self, prompt: &str, options: &GenerateOptions, json_mode: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !options.system_prompt.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: options.system_prompt.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        ChatRequest {
            model: if options.model.is_empty() {
                self.model.clone()
            } else {
                options.model.clone()
            },
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: options.stop_sequences.clone(),
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<GenerationResponse, AiError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(model = %request.model, "Sending OpenAI chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
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
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(unavailable(format!("API error ({status}): {reason}")));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let choice = parsed.choices.into_iter().next();
        let finish_reason = choice
            .as_ref()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "stop".to_string());

        Ok(GenerationResponse {
            content: choice.and_then(|c| c.message.content).unwrap_or_default(),
            model: parsed.model,
            tokens_used: parsed.usage.map_or(0, |u| u.total_tokens),
            finish_reason,
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
impl AiProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        let request = self.build_request(prompt, options, false);
        self.chat(&request).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
        options: &GenerateOptions,
    ) -> Result<serde_json::Value, AiError> {
        let prompt = format!(
            "{prompt}\n\nRespond with a single JSON object matching this schema:\n{schema}"
        );
        let request = self.build_request(&prompt, options, true);
        let response = self.chat(&request).await?;

        serde_json::from_str(strip_code_fence(&response.content)).map_err(|e| {
            AiError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("expected JSON: {e}"),
            }
        })
    }
}
