//! Completion Client
//!
//! A single prompt-in, text-out exchange with an OpenAI-compatible chat API.
//! Every other component in the tutor depends only on the [`LLMClient`] trait.

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Upper bound on generated tokens per completion.
pub const MAX_OUTPUT_TOKENS: u32 = 500;
/// Sampling temperature for every completion.
pub const TEMPERATURE: f32 = 0.5;
/// Prefix of the error text shown in place of content under [`ErrorPolicy::Lenient`].
pub const SENTINEL_PREFIX: &str = "An error occurred: ";

/// Failure of a single completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0}")]
    Request(#[from] OpenAIError),
    #[error("The API response was empty or malformed.")]
    EmptyResponse,
}

impl CompletionError {
    /// Renders the error as `"An error occurred: <details>"`.
    pub fn sentinel(&self) -> String {
        format!("{SENTINEL_PREFIX}{self}")
    }
}

/// Returns true if `text` is an error rendered by [`CompletionError::sentinel`].
pub fn is_sentinel(text: &str) -> bool {
    text.starts_with(SENTINEL_PREFIX)
}

/// How session components treat a failed completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Failures reach the caller as errors and are reported as such.
    #[default]
    Surface,
    /// Failures are turned into sentinel text and displayed like any other reply.
    Lenient,
}

impl ErrorPolicy {
    /// Applies the policy to the outcome of a completion call.
    ///
    /// Under `Lenient` this never returns `Err`.
    pub fn resolve(
        self,
        result: Result<String, CompletionError>,
    ) -> Result<String, CompletionError> {
        match (self, result) {
            (ErrorPolicy::Lenient, Err(e)) => Ok(e.sentinel()),
            (_, result) => result,
        }
    }
}

/// A generic client for a text-generation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends `prompt` as a single user message and returns the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-3.5-turbo").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }

    /// Like [`OpenAICompatibleClient::new`], but sends requests through `http_client`.
    pub fn with_http_client(
        config: OpenAIConfig,
        model: String,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            client: Client::with_config(config).with_http_client(http_client),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?
            .into();

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message])
            .max_tokens(MAX_OUTPUT_TOKENS)
            .temperature(TEMPERATURE)
            .build()?;

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!(error = %e, "Completion request failed");
            CompletionError::from(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_rendering() {
        let err = CompletionError::EmptyResponse;
        assert_eq!(
            err.sentinel(),
            "An error occurred: The API response was empty or malformed."
        );
        assert!(is_sentinel(&err.sentinel()));
        assert!(!is_sentinel("1. Algebra Basics"));
    }

    #[test]
    fn test_lenient_policy_turns_errors_into_text() {
        let resolved = ErrorPolicy::Lenient.resolve(Err(CompletionError::EmptyResponse));
        let text = resolved.expect("lenient policy never fails");
        assert!(is_sentinel(&text));
    }

    #[test]
    fn test_surface_policy_passes_errors_through() {
        let resolved = ErrorPolicy::Surface.resolve(Err(CompletionError::EmptyResponse));
        assert!(matches!(resolved, Err(CompletionError::EmptyResponse)));

        let ok = ErrorPolicy::Surface.resolve(Ok("fine".to_string()));
        assert_eq!(ok.unwrap(), "fine");
    }

    #[test]
    fn test_default_policy_is_surface() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Surface);
    }

    #[test]
    fn test_client_keeps_model() {
        let client = OpenAICompatibleClient::new(
            OpenAIConfig::new().with_api_key("test-key"),
            DEFAULT_MODEL.to_string(),
        );
        assert_eq!(client.model(), "gpt-3.5-turbo");
    }
}
