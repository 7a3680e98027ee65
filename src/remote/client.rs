/// Chat-completion client implementation.
///
/// This module provides `ChatCompletionClient` for making synchronous HTTP
/// requests to a chat-completion API, along with error types and the builder
/// used to configure it.
use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;

/// Default chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";

/// Default model identifier sent with each request.
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";

/// Upper bound on a whole request, after which the caller falls back locally.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Token budget for a single completion.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when calling the chat-completion API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No API token is configured, so no request was attempted.
    #[error("Missing API token (set HF_API_TOKEN)")]
    MissingCredential,

    /// The endpoint answered with a non-success status.
    #[error("Remote API error: status {status}")]
    Api { status: u16, body: String },

    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("Malformed response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// Invalid endpoint URL configuration.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else if error.is_decode() {
            Self::Decode(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Trait for chat-completion operations.
///
/// This trait enables mocking in unit tests and lets the service run with
/// no remote model at all.
pub trait ChatClientTrait: Send + Sync {
    /// Sends a system instruction and a user prompt, returning the answer text.
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError>;
}

/// Builder for constructing `ChatCompletionClient` instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sidekick::remote::ChatCompletionClientBuilder;
///
/// let client = ChatCompletionClientBuilder::new()
///     .endpoint("http://localhost:8080/v1/chat/completions")
///     .api_token("hf_test")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .expect("Failed to create client");
///
/// assert_eq!(client.timeout(), Duration::from_secs(10));
/// ```
#[derive(Debug, Default)]
pub struct ChatCompletionClientBuilder {
    endpoint: Option<String>,
    model: Option<String>,
    api_token: Option<String>,
    timeout: Option<Duration>,
    max_tokens: Option<u32>,
}

impl ChatCompletionClientBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full chat-completion URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the bearer token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the completion token budget.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Builds the `ChatCompletionClient`.
    ///
    /// # Environment Variables
    ///
    /// Values not set on the builder are read from the environment:
    /// `HF_API_URL`, `HF_MODEL_ID`, `HF_API_TOKEN` and `HF_TIMEOUT_SECS`.
    /// Missing endpoint, model and timeout fall back to the crate defaults.
    /// A missing or empty token is allowed here; every request then fails
    /// with [`RemoteError::MissingCredential`].
    pub fn build(self) -> Result<ChatCompletionClient, RemoteError> {
        let endpoint = self
            .endpoint
            .or_else(|| env_non_empty("HF_API_URL"))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let model = self
            .model
            .or_else(|| env_non_empty("HF_MODEL_ID"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_token = self
            .api_token
            .or_else(|| env_non_empty("HF_API_TOKEN"))
            .filter(|token| !token.trim().is_empty());

        let timeout = self
            .timeout
            .or_else(timeout_from_env)
            .unwrap_or(DEFAULT_TIMEOUT);

        reqwest::Url::parse(&endpoint)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(RemoteError::Network)?;

        Ok(ChatCompletionClient {
            client,
            endpoint,
            model,
            api_token,
            timeout,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn timeout_from_env() -> Option<Duration> {
    let raw = env_non_empty("HF_TIMEOUT_SECS")?;
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(value = %raw, "Ignoring invalid HF_TIMEOUT_SECS");
            None
        }
    }
}

/// Synchronous client for an OpenAI-compatible chat-completion endpoint.
///
/// Each call is a single attempt bounded by the configured timeout; callers
/// are expected to fall back on failure rather than retry.
pub struct ChatCompletionClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_token: Option<String>,
    timeout: Duration,
    max_tokens: u32,
}

impl ChatCompletionClient {
    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns true when an API token is configured.
    pub fn has_credential(&self) -> bool {
        self.api_token.is_some()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "max_tokens": self.max_tokens,
        })
    }
}

impl ChatClientTrait for ChatCompletionClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError> {
        let Some(token) = self.api_token.as_deref() else {
            tracing::error!("Missing HF_API_TOKEN in environment");
            return Err(RemoteError::MissingCredential);
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&self.request_body(system, prompt))
            .send()
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Chat-completion API error");
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().map_err(RemoteError::from_reqwest)?;
        Ok(extract_completion(payload))
    }
}

/// Extracts the answer text from a chat-completion response.
///
/// Reads `choices[0].message.content` when it is non-empty and non-zero.
/// Array and object content comes back as JSON text. When the payload has an
/// unexpected shape the raw payload is returned instead (a bare JSON string
/// as-is, anything else serialized), so a reachable model never triggers
/// fallback.
pub fn extract_completion(payload: Value) -> String {
    match payload.pointer("/choices/0/message/content") {
        Some(Value::String(content)) if !content.is_empty() => return content.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => return n.to_string(),
        Some(content @ (Value::Array(_) | Value::Object(_))) => return content.to_string(),
        Some(Value::Bool(true)) => return "true".to_string(),
        _ => {}
    }

    tracing::warn!(payload = %payload, "Unexpected chat-completion response format");
    match payload {
        Value::String(raw) => raw,
        other => other.to_string(),
    }
}

/// Client used when no remote model should be contacted.
///
/// Every call fails with [`RemoteError::MissingCredential`], which sends the
/// caller straight to the local fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatClient;

impl ChatClientTrait for NoopChatClient {
    fn complete(&self, _system: &str, _prompt: &str) -> Result<String, RemoteError> {
        Err(RemoteError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            std::env::remove_var("HF_API_URL");
            std::env::remove_var("HF_MODEL_ID");
            std::env::remove_var("HF_API_TOKEN");
            std::env::remove_var("HF_TIMEOUT_SECS");
        }
    }

    #[test]
    fn api_error_display_includes_status() {
        let error = RemoteError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("Remote API error"));
        assert!(msg.contains("503"));
    }

    #[test]
    #[serial]
    fn build_uses_defaults_when_nothing_configured() {
        clear_env();

        let client = ChatCompletionClientBuilder::new().build().unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert!(!client.has_credential());
    }

    #[test]
    #[serial]
    fn build_reads_environment_variables() {
        clear_env();
        unsafe {
            std::env::set_var("HF_API_URL", "http://env-host:9000/v1/chat/completions");
            std::env::set_var("HF_MODEL_ID", "env-model");
            std::env::set_var("HF_API_TOKEN", "hf_env");
            std::env::set_var("HF_TIMEOUT_SECS", "7");
        }

        let client = ChatCompletionClientBuilder::new().build().unwrap();
        assert_eq!(client.endpoint(), "http://env-host:9000/v1/chat/completions");
        assert_eq!(client.model(), "env-model");
        assert!(client.has_credential());
        assert_eq!(client.timeout(), Duration::from_secs(7));

        clear_env();
    }

    #[test]
    #[serial]
    fn builder_values_take_precedence_over_environment() {
        clear_env();
        unsafe {
            std::env::set_var("HF_MODEL_ID", "env-model");
        }

        let client = ChatCompletionClientBuilder::new()
            .model("builder-model")
            .build()
            .unwrap();
        assert_eq!(client.model(), "builder-model");

        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_timeout_env_falls_back_to_default() {
        clear_env();
        unsafe {
            std::env::set_var("HF_TIMEOUT_SECS", "soon");
        }

        let client = ChatCompletionClientBuilder::new().build().unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        clear_env();
    }

    #[test]
    #[serial]
    fn blank_token_counts_as_missing() {
        clear_env();
        let client = ChatCompletionClientBuilder::new()
            .api_token("   ")
            .build()
            .unwrap();
        assert!(!client.has_credential());
    }

    #[test]
    fn build_rejects_invalid_url() {
        let result = ChatCompletionClientBuilder::new()
            .endpoint("not-a-valid-url")
            .build();
        assert!(matches!(result, Err(RemoteError::InvalidUrl(_))));
    }

    #[test]
    #[serial]
    fn complete_without_token_fails_before_any_request() {
        clear_env();
        // unroutable endpoint: reaching the network would surface as Network, not MissingCredential
        let client = ChatCompletionClientBuilder::new()
            .endpoint("http://127.0.0.1:9/v1/chat/completions")
            .build()
            .unwrap();

        let result = client.complete("system", "prompt");
        assert!(matches!(result, Err(RemoteError::MissingCredential)));
    }

    #[test]
    fn request_body_carries_system_and_user_messages() {
        let client = ChatCompletionClientBuilder::new()
            .model("m")
            .max_tokens(64)
            .build()
            .unwrap();

        let body = client.request_body("be grounded", "what is it?");
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be grounded");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "what is it?");
    }

    #[test]
    fn extract_completion_reads_first_choice() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "The total is $500." } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(extract_completion(payload), "The total is $500.");
    }

    #[test]
    fn extract_completion_returns_raw_string_payload() {
        let payload = Value::String("plain answer".to_string());
        assert_eq!(extract_completion(payload), "plain answer");
    }

    #[test]
    fn extract_completion_serializes_unknown_shape() {
        let payload = json!({ "generated_text": "hi" });
        assert_eq!(extract_completion(payload), r#"{"generated_text":"hi"}"#);
    }

    #[test]
    fn extract_completion_treats_empty_content_as_unknown_shape() {
        let payload = json!({ "choices": [ { "message": { "content": "" } } ] });
        let result = extract_completion(payload);
        assert!(result.contains("choices"));
    }

    #[test]
    fn extract_completion_treats_zero_content_as_unknown_shape() {
        let payload = json!({ "choices": [ { "message": { "content": 0 } } ] });
        assert_eq!(
            extract_completion(payload),
            r#"{"choices":[{"message":{"content":0}}]}"#
        );
    }

    #[test]
    fn extract_completion_stringifies_nonzero_number() {
        let payload = json!({ "choices": [ { "message": { "content": 42 } } ] });
        assert_eq!(extract_completion(payload), "42");
    }

    #[test]
    fn noop_client_always_reports_missing_credential() {
        let result = NoopChatClient.complete("s", "p");
        assert!(matches!(result, Err(RemoteError::MissingCredential)));
    }

    #[test]
    fn trait_can_be_implemented_by_mock_struct() {
        struct MockClient {
            response: String,
        }

        impl ChatClientTrait for MockClient {
            fn complete(&self, _system: &str, _prompt: &str) -> Result<String, RemoteError> {
                Ok(self.response.clone())
            }
        }

        let mock = MockClient {
            response: "test response".to_string(),
        };
        assert_eq!(mock.complete("s", "p").unwrap(), "test response");
    }
}
