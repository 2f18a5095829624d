//! Text-generation bridge.
//!
//! The rest of the crate talks to an injected [`TextGenerator`] capability so
//! every caller has a deterministic fallback path that can be exercised
//! without a live service. The production implementation speaks the Claude
//! messages API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Service unavailable")]
  Unavailable,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Capability trait
/// ---------------------------------------------------------------------------

/// A function from (instructions, prompt) to generated text. Callers must
/// check availability first and fall back deterministically when the service
/// is missing or fails.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
  fn is_available(&self) -> bool;

  async fn generate(&self, instructions: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Generator that is never available. Used for offline mode; forces every
/// caller onto its rule-based fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGenerator;

impl TextGenerator for NullGenerator {
  fn is_available(&self) -> bool {
    false
  }

  async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String, LlmError> {
    Err(LlmError::Unavailable)
  }
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  system: String,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Claude Client
/// ---------------------------------------------------------------------------

pub struct ClaudeGenerator {
  client: Client,
  api_key: Option<String>,
  api_url: String,
  model: String,
}

impl ClaudeGenerator {
  /// Build a client from the environment. A missing key is not an error
  /// here; it just makes the generator unavailable.
  pub fn from_env() -> Self {
    Self {
      client: Client::new(),
      api_key: std::env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()),
      api_url: std::env::var("TRACKGYM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
      model: std::env::var("TRACKGYM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
    }
  }

  #[cfg(test)]
  pub fn with_api_url(api_key: &str, api_url: &str) -> Self {
    Self {
      client: Client::new(),
      api_key: Some(api_key.to_string()),
      api_url: api_url.to_string(),
      model: DEFAULT_MODEL.to_string(),
    }
  }

  async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
    let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

    let request = ClaudeRequest {
      model: self.model.clone(),
      max_tokens: MAX_TOKENS,
      system: system_prompt.to_string(),
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let response = self
      .client
      .post(&self.api_url)
      .header("x-api-key", api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
  }
}

impl TextGenerator for ClaudeGenerator {
  fn is_available(&self) -> bool {
    self.api_key.is_some()
  }

  async fn generate(&self, instructions: &str, prompt: &str) -> Result<String, LlmError> {
    self.complete(instructions, prompt).await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
