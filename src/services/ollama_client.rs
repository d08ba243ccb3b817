//! Ollama HTTP client for local model inference.
//!
//! The `LlmClient` trait is the seam between the fallback service and
//! the model backend; `MockLlmClient` implements it for tests without a
//! running model host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Cannot reach model host at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Model host returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing failed: {0}")]
    ResponseParse(String),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),
}

/// Decoding and resource options passed through to the model host.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    /// 0.0 → deterministic decoding
    pub temperature: f32,
    pub top_p: f32,
    /// Bound on output length; the only implicit inference timeout.
    pub num_predict: i32,
    /// Context window size
    pub num_ctx: u32,
    /// Inference thread count
    pub num_thread: u32,
    /// Accelerator layer count (0 = processor-only)
    pub num_gpu: u32,
}

/// Client seam for the local text-generation model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one generation with deterministic options.
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, LlmError>;

    /// Is the model already present in local storage?
    async fn is_model_available(&self, model: &str) -> Result<bool, LlmError>;

    /// Fetch model weights into local storage.
    async fn pull_model(&self, model: &str) -> Result<(), LlmError>;
}

/// HTTP client for a local Ollama instance.
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client pointing at an Ollama base URL.
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_connect() {
            LlmError::Connection(self.base_url.clone())
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Serialize)]
struct PullBody<'a> {
    name: &'a str,
    stream: bool,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateBody {
            model,
            prompt,
            system,
            stream: false,
            options,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParse(e.to_string()))?;

        Ok(parsed.response)
    }

    async fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParse(e.to_string()))?;

        Ok(parsed.models.iter().any(|m| m.name.starts_with(model)))
    }

    async fn pull_model(&self, model: &str) -> Result<(), LlmError> {
        let url = format!("{}/api/pull", self.base_url);
        let body = PullBody {
            name: model,
            stream: false,
        };

        tracing::info!(model = %model, "Pulling model weights into local storage");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ModelUnavailable(format!(
                "pull of {model} failed ({status}): {body}"
            )));
        }

        Ok(())
    }
}

/// Mock model client for tests: canned response plus call counters.
pub struct MockLlmClient {
    response: String,
    available: AtomicBool,
    fail_pull: bool,
    generate_calls: AtomicUsize,
    pull_calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            available: AtomicBool::new(true),
            fail_pull: false,
            generate_calls: AtomicUsize::new(0),
            pull_calls: AtomicUsize::new(0),
        }
    }

    /// Start with the model absent from local storage.
    pub fn with_missing_model(mut self) -> Self {
        self.available = AtomicBool::new(false);
        self
    }

    /// Make pulls fail (model artifact unavailable at the source).
    pub fn with_failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn pull_calls(&self) -> usize {
        self.pull_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(
        &self,
        _model: &str,
        _system: &str,
        _prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<String, LlmError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    async fn is_model_available(&self, _model: &str) -> Result<bool, LlmError> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn pull_model(&self, model: &str) -> Result<(), LlmError> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pull {
            return Err(LlmError::ModelUnavailable(model.to_string()));
        }
        self.available.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> GenerateOptions {
        GenerateOptions {
            temperature: 0.0,
            top_p: 1.0,
            num_predict: 128,
            num_ctx: 2048,
            num_thread: 2,
            num_gpu: 0,
        }
    }

    #[tokio::test]
    async fn mock_returns_canned_response_and_counts_calls() {
        let client = MockLlmClient::new("hello");
        let out = client.generate("m", "s", "p", &options()).await.unwrap();
        assert_eq!(out, "hello");
        assert_eq!(client.generate_calls(), 1);
    }

    #[tokio::test]
    async fn mock_pull_makes_model_available() {
        let client = MockLlmClient::new("").with_missing_model();
        assert!(!client.is_model_available("m").await.unwrap());
        client.pull_model("m").await.unwrap();
        assert!(client.is_model_available("m").await.unwrap());
        assert_eq!(client.pull_calls(), 1);
    }

    #[tokio::test]
    async fn mock_failing_pull_reports_unavailable() {
        let client = MockLlmClient::new("").with_missing_model().with_failing_pull();
        let err = client.pull_model("tinyllama").await.unwrap_err();
        assert!(matches!(err, LlmError::ModelUnavailable(_)));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/").unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn generate_body_serializes_options() {
        let opts = options();
        let body = GenerateBody {
            model: "tinyllama",
            prompt: "p",
            system: "s",
            stream: false,
            options: &opts,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["options"]["temperature"], 0.0);
        assert_eq!(value["options"]["num_gpu"], 0);
        assert_eq!(value["stream"], false);
    }
}
