//! Ollama provider for locally hosted models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::errors::AiError;

use super::provider::{http_client, AiProvider, GenerateOptions, GenerationResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3";
const PROVIDER: &str = "ollama";

#[derive(Debug, Serialize)]
struct ModelOptions {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: ModelOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    model: String,
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

/// Ollama provider. No credential is needed.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        Ok(Self {
            client: http_client(PROVIDER, config)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationResponse, AiError> {
        let request = GenerateRequest {
            model: if options.model.is_empty() {
                self.model.clone()
            } else {
                options.model.clone()
            },
            prompt: prompt.to_string(),
            system: (!options.system_prompt.is_empty()).then(|| options.system_prompt.clone()),
            stream: false,
            options: ModelOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
                stop: options.stop_sequences.clone(),
            },
        };

        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        debug!(model = %request.model, url = %url, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::ProviderUnavailable {
                provider: PROVIDER.to_string(),
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::ProviderUnavailable {
                provider: PROVIDER.to_string(),
                reason: format!("API error ({status}): {body}"),
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(GenerationResponse {
            content: parsed.response,
            model: parsed.model,
            tokens_used: parsed.prompt_eval_count + parsed.eval_count,
            finish_reason: parsed.done_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3",
                "response": "COMMANDS:\n- kubectl get pods | list | true",
                "done": true,
                "done_reason": "stop",
                "prompt_eval_count": 20,
                "eval_count": 12
            })))
            .mount(&server)
            .await;

        let config = AiConfig {
            provider: PROVIDER.to_string(),
            base_url: Some(server.uri()),
            ..AiConfig::default()
        };
        let provider = OllamaProvider::from_config(&config).unwrap();
        let response = provider
            .generate("list pods", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(response.content.contains("kubectl get pods"));
        assert_eq!(response.tokens_used, 32);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = AiConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 2,
            ..AiConfig::default()
        };
        let provider = OllamaProvider::from_config(&config).unwrap();
        let err = provider
            .generate("hello", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::ProviderUnavailable { .. }));
    }
}
