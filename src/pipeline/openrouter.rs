//! OpenRouter chat-completions client with model fallback.
//!
//! Remote analysis and synthesis both go through a [`ModelChain`], which
//! tries a primary model first and falls back to alternates when a call
//! fails. The HTTP surface is behind the [`ChatApi`] trait so tests can
//! substitute a mock.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::ModelCallError;

/// Sent as the X-Title header so OpenRouter attributes the traffic.
const CLIENT_TITLE: &str = "Musicology Research Assistant";

/// Chat completion backend. One call, one answer string.
pub trait ChatApi {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, ModelCallError>;
}

/// HTTP client for the OpenRouter chat completions endpoint.
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenRouterClient {
    /// Create a client. Fails fast when no API key is configured.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, ModelCallError> {
        if api_key.trim().is_empty() {
            return Err(ModelCallError::MissingCredential);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelCallError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

impl ChatApi for OpenRouterClient {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, ModelCallError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", CLIENT_TITLE)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ModelCallError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ModelCallError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ModelCallError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelCallError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| ModelCallError::ResponseParsing(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelCallError::ResponseParsing("completion had no choices".into()))?;

        Ok(choice.message.content)
    }
}

/// Ordered list of models tried in sequence until one answers.
pub struct ModelChain {
    api: Box<dyn ChatApi + Send + Sync>,
    models: Vec<String>,
}

impl ModelChain {
    pub fn new(api: Box<dyn ChatApi + Send + Sync>, models: Vec<String>) -> Self {
        Self { api, models }
    }

    /// Run the prompt through the chain. Returns the first successful
    /// completion; errs only when every model fails.
    pub fn complete(&self, system: &str, user: &str) -> Result<String, ModelCallError> {
        if self.models.is_empty() {
            return Err(ModelCallError::NoModelsConfigured);
        }

        let mut last_error = String::new();
        for model in &self.models {
            info!(model = %model, "Calling chat model");
            match self.api.chat(model, system, user) {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(model = %model, error = %e, "Chat model failed, trying next");
                    last_error = e.to_string();
                }
            }
        }

        error!("All chat models failed");
        Err(ModelCallError::AllModelsFailed(last_error))
    }
}

/// Mock chat API for testing — answers per model, or fails on demand.
pub struct MockChatApi {
    default_response: Option<String>,
    per_model: std::collections::HashMap<String, Option<String>>,
}

impl MockChatApi {
    /// Every model answers with the given response.
    pub fn new(response: &str) -> Self {
        Self {
            default_response: Some(response.to_string()),
            per_model: std::collections::HashMap::new(),
        }
    }

    /// Every model fails.
    pub fn failing() -> Self {
        Self {
            default_response: None,
            per_model: std::collections::HashMap::new(),
        }
    }

    pub fn with_model_response(mut self, model: &str, response: &str) -> Self {
        self.per_model
            .insert(model.to_string(), Some(response.to_string()));
        self
    }

    pub fn failing_for(mut self, model: &str) -> Self {
        self.per_model.insert(model.to_string(), None);
        self
    }
}

impl ChatApi for MockChatApi {
    fn chat(&self, model: &str, _system: &str, _user: &str) -> Result<String, ModelCallError> {
        let slot = self
            .per_model
            .get(model)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone());

        match slot {
            Some(response) => Ok(response),
            None => Err(ModelCallError::Api {
                status: 500,
                body: "mock model failure".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_requires_api_key() {
        let result = OpenRouterClient::new("https://openrouter.ai/api/v1", "  ", 60);
        assert!(matches!(result, Err(ModelCallError::MissingCredential)));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OpenRouterClient::new("https://openrouter.ai/api/v1/", "sk-test", 60).unwrap();
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn chain_returns_first_successful_completion() {
        let chain = ModelChain::new(
            Box::new(MockChatApi::new("primary answer")),
            vec!["model-a".into(), "model-b".into()],
        );
        let result = chain.complete("system", "user").unwrap();
        assert_eq!(result, "primary answer");
    }

    #[test]
    fn chain_falls_back_when_primary_fails() {
        let api = MockChatApi::new("fallback answer").failing_for("model-a");
        let chain = ModelChain::new(Box::new(api), vec!["model-a".into(), "model-b".into()]);

        let result = chain.complete("system", "user").unwrap();
        assert_eq!(result, "fallback answer");
    }

    #[test]
    fn chain_errs_when_all_models_fail() {
        let chain = ModelChain::new(
            Box::new(MockChatApi::failing()),
            vec!["model-a".into(), "model-b".into()],
        );

        let result = chain.complete("system", "user");
        assert!(matches!(result, Err(ModelCallError::AllModelsFailed(_))));
    }

    #[test]
    fn chain_errs_when_no_models_configured() {
        let chain = ModelChain::new(Box::new(MockChatApi::new("unused")), vec![]);
        let result = chain.complete("system", "user");
        assert!(matches!(result, Err(ModelCallError::NoModelsConfigured)));
    }

    #[test]
    fn mock_answers_per_model() {
        let api = MockChatApi::failing().with_model_response("model-b", "b answer");
        assert!(api.chat("model-a", "s", "u").is_err());
        assert_eq!(api.chat("model-b", "s", "u").unwrap(), "b answer");
    }
}
