//! OpenAI-compatible chat-completion client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ClaimError;
use crate::{CompletionPrompt, CompletionProvider};

/// Completion endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// Bearer token; absent for local endpoints
    pub api_key: Option<String>,
    /// Per-call budget enforced by the claim service
    pub timeout_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        CompletionConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_ms: 20_000,
        }
    }
}

impl CompletionConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CITEAUDIT_COMPLETION_URL") {
            self.base_url = url;
        }
        if let Ok(model) = std::env::var("CITEAUDIT_COMPLETION_MODEL") {
            self.model = model;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        self
    }
}

/// Client for any endpoint speaking the `/chat/completions` protocol.
pub struct OpenAiCompatibleProvider {
    config: CompletionConfig,
    http_client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: CompletionConfig) -> Result<Self, ClaimError> {
        let http_client = reqwest::Client::builder()
            .user_agent(format!("citeaudit/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(OpenAiCompatibleProvider {
            config,
            http_client,
        })
    }

    fn request_body(&self, prompt: &CompletionPrompt) -> Value {
        json!({
            "model": self.config.model,
            "temperature": 0,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, ClaimError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(model = %self.config.model, "requesting claim judgment");

        let mut request = self.http_client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClaimError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion response.
pub fn extract_content(body: &Value) -> Result<String, ClaimError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|c| !c.trim().is_empty())
        .ok_or(ClaimError::EmptyResponse)
}
