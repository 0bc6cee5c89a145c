// Anthropic Claude copy writer
//
// Implementation of CopyWriter for Anthropic's Messages API. Copy snippets
// are short, so requests are single-shot rather than streamed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use eventola_core::copy::{CopyConfig, CopyWriter};
use eventola_core::error::{EventolaError, Result};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude copy writer
///
/// # Example
///
/// ```ignore
/// use eventola_anthropic::AnthropicCopyWriter;
///
/// let writer = AnthropicCopyWriter::from_env()?;
/// // or
/// let writer = AnthropicCopyWriter::new("your-api-key");
/// ```
#[derive(Clone)]
pub struct AnthropicCopyWriter {
    client: Client,
    api_key: String,
    api_url: String,
}

impl AnthropicCopyWriter {
    /// Create a new writer with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Create a new writer from the ANTHROPIC_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| EventolaError::config("ANTHROPIC_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key))
    }

    /// Create a new writer with a custom API URL
    pub fn with_base_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl CopyWriter for AnthropicCopyWriter {
    async fn complete(&self, system: &str, prompt: &str, config: &CopyConfig) -> Result<String> {
        let request = AnthropicRequest {
            model: config.model.clone(),
            max_tokens: config.max_tokens.max(1),
            temperature: config.temperature,
            system: Some(system.to_string()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EventolaError::copy(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EventolaError::copy(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| EventolaError::copy(format!("Failed to parse response: {}", e)))?;

        let text: String = body
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(EventolaError::copy("Anthropic returned an empty completion"));
        }

        Ok(text.trim().to_string())
    }
}

impl std::fmt::Debug for AnthropicCopyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicCopyWriter")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}
