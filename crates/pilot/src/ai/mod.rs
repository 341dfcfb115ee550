//! AI provider gateway.
//!
//! This module provides:
//! - The [`AiProvider`] trait every backend implements
//! - A deterministic offline backend ([`MockProvider`])
//! - HTTP backends for OpenAI, Anthropic and Ollama
//! - [`create_provider`] to pick one from configuration

pub mod provider;

// Provider implementations
pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

// Re-exports
pub use mock::MockProvider;
pub use provider::{
    create_provider, send, AiProvider, GenerateOptions, GenerationRequest, GenerationResponse,
    ProviderKind,
};
