//! Gemini REST client.
//!
//! This module provides an async interface to the Generative Language API
//! `models/{model}:generateContent` endpoint, with schema-constrained JSON
//! output and error classification.

use crate::config::{ConfigError, GeminiConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur when calling Gemini
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Failed to reach Gemini: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Gemini returned an error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Gemini returned no content: {0}")]
    EmptyResponse(String),

    #[error("Invalid response envelope from Gemini: {0}")]
    InvalidEnvelope(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Request to send to Gemini
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    /// The model to use (e.g., "gemini-2.5-flash")
    pub model: String,

    /// The prompt to send
    pub prompt: String,

    /// Temperature for response generation (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Structured-output schema; implies a JSON response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl GeminiRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: None,
            response_schema: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Estimate input tokens (rough approximation: chars / 4)
    pub fn estimate_input_tokens(&self) -> u32 {
        (self.prompt.len() / 4) as u32
    }

    /// The `generateContent` request body
    pub fn to_body(&self) -> Value {
        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(schema) = &self.response_schema {
            generation_config.insert("responseMimeType".to_string(), json!("application/json"));
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }

        json!({
            "contents": [
                { "role": "user", "parts": [ { "text": self.prompt } ] }
            ],
            "generationConfig": generation_config,
        })
    }
}

/// Response from Gemini
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    /// Concatenated text of the first candidate
    pub text: String,

    /// Model used
    pub model: String,

    /// Why generation stopped, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GeminiResponse {
    /// Estimate output tokens (rough approximation: chars / 4)
    pub fn estimate_output_tokens(&self) -> u32 {
        (self.text.len() / 4) as u32
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Gemini REST API
pub struct GeminiClient {
    http: reqwest::Client,

    api_key: String,

    /// Model to use
    model: String,

    /// Base URL, without trailing slash
    base_url: String,

    /// Timeout in seconds (0 = no timeout)
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a new GeminiClient
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = GeminiConfig::default();
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: defaults.base_url,
            timeout_secs: defaults.timeout_secs,
        }
    }

    /// Build a client from configuration; fails when the API key is absent
    pub fn from_config(config: &GeminiConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(Self::new(api_key, &config.model)
            .with_base_url(&config.base_url)
            .with_timeout(config.timeout_secs))
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the timeout in seconds
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Call Gemini once. No retries.
    #[instrument(skip(self, req), fields(model = %req.model, prompt_len = req.prompt.len()))]
    pub async fn generate_content(&self, req: &GeminiRequest) -> Result<GeminiResponse, GeminiError> {
        debug!("Calling Gemini with ~{} input tokens", req.estimate_input_tokens());

        let mut builder = self
            .http
            .post(self.endpoint(&req.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&req.to_body());
        if self.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.timeout_secs));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GeminiError::Timeout(self.timeout_secs)
            } else {
                GeminiError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GeminiError::Timeout(self.timeout_secs)
            } else {
                GeminiError::Transport(e.to_string())
            }
        })?;

        debug!("Gemini HTTP status: {}", status);

        if !(200..300).contains(&status) {
            return Err(classify_error(status, &body));
        }

        parse_response(&body, &req.model)
    }
}

/// Map a non-2xx response to an error, keeping the provider's message
fn classify_error(status: u16, body: &str) -> GeminiError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => GeminiError::AuthenticationError(message),
        429 => GeminiError::RateLimitError(message),
        _ => GeminiError::ApiError { status, message },
    }
}

/// Pull the first candidate's text out of a `generateContent` response
fn parse_response(body: &str, model: &str) -> Result<GeminiResponse, GeminiError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GeminiError::InvalidEnvelope(e.to_string()))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({})", r))
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(GeminiError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        warn!("Gemini candidate had no text (finish reason: {})", reason);
        return Err(GeminiError::EmptyResponse(format!(
            "finish reason {}",
            reason
        )));
    }

    Ok(GeminiResponse {
        text,
        model: model.to_string(),
        finish_reason: candidate.finish_reason,
    })
}
