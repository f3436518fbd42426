//! Request transport
//!
//! The rotation client treats the outbound call as an opaque dependency:
//! a backend binds one API key plus fixed model parameters into a handle,
//! and the handle dispatches prompts. Failures are surfaced with enough
//! text for the caller to classify; no retry logic lives here.

use crate::api::{CompletionRequest, CompletionResponse};
use crate::config::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A request handle bound to exactly one credential
#[async_trait]
pub trait CompletionHandle: Send + Sync {
    /// Dispatch one prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Factory for bound handles
pub trait CompletionBackend: Send + Sync {
    /// Build a handle from one API key and fixed model parameters
    fn bind(&self, api_key: &str, model: &str, temperature: f32) -> Box<dyn CompletionHandle>;
}

/// Backend for Groq-style OpenAI-compatible chat-completions endpoints
pub struct GroqBackend {
    client: Client,
    base_url: String,
}

impl GroqBackend {
    /// Create a backend against the default Groq endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a backend against a custom endpoint (also used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300)) // 5 minute timeout for long completions
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl CompletionBackend for GroqBackend {
    fn bind(&self, api_key: &str, model: &str, temperature: f32) -> Box<dyn CompletionHandle> {
        Box::new(GroqHandle {
            client: self.client.clone(),
            url: format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }
}

struct GroqHandle {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[async_trait]
impl CompletionHandle for GroqHandle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest::from_prompt(&self.model, prompt)
            .with_temperature(self.temperature);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
                Error::Response(format!(
                    "failed to parse completion: {}; body: {}",
                    e,
                    snippet(&body)
                ))
            })?;
            return parsed
                .content()
                .ok_or_else(|| Error::Response("completion contained no choices".to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                message: snippet(&body),
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(snippet(&body)));
        }

        Err(Error::Api {
            status: status.as_u16(),
            message: snippet(&body),
        })
    }
}

/// Keep error messages readable when providers return huge bodies
fn snippet(body: &str) -> String {
    body.chars().take(500).collect()
}
