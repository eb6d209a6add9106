//! Quiz generation pipeline.
//!
//! Builds the prompt for a [`QuizRequest`], makes a single call to the
//! provider, then parses and validates the JSON it returns into a [`Quiz`].

use crate::extract::{self, ExtractError};
use crate::gemini::{GeminiClient, GeminiError, GeminiRequest, GeminiResponse};
use crate::model::{Quiz, QuizRequest};
use crate::prompt::build_prompt;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Sampling temperature for every generation call
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Errors surfaced to whoever asked for a quiz
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0}")]
    InputMissing(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    UnsupportedFileType(String),

    #[error("{0}")]
    UnreadableFile(String),

    #[error("Failed to generate quiz: {0}")]
    GenerationFailed(String),

    #[error("Invalid response format: {0}")]
    MalformedResponse(String),
}

impl From<ExtractError> for QuizError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFileType(_) => QuizError::UnsupportedFileType(e.to_string()),
            ExtractError::UnreadableFile(_) => QuizError::UnreadableFile(e.to_string()),
        }
    }
}

impl From<GeminiError> for QuizError {
    fn from(e: GeminiError) -> Self {
        QuizError::GenerationFailed(e.to_string())
    }
}

/// Something that can answer a schema-constrained generation request
#[async_trait]
pub trait QuizProvider: Send + Sync {
    async fn generate(&self, request: &GeminiRequest) -> Result<GeminiResponse, GeminiError>;

    /// Model name used when building requests
    fn model(&self) -> &str;
}

#[async_trait]
impl QuizProvider for GeminiClient {
    async fn generate(&self, request: &GeminiRequest) -> Result<GeminiResponse, GeminiError> {
        self.generate_content(request).await
    }

    fn model(&self) -> &str {
        GeminiClient::model(self)
    }
}

/// An uploaded file accompanying a generation request
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

/// Decide the source text: an uploaded file wins over pasted text
pub fn resolve_source(file: Option<&SourceFile>, text: Option<String>) -> Result<String, QuizError> {
    match file {
        Some(file) => {
            debug!(
                "Extracting source from upload {:?} ({} bytes)",
                file.file_name,
                file.bytes.len()
            );
            Ok(extract::extract_upload(
                &file.bytes,
                file.mime_type.as_deref(),
                file.file_name.as_deref(),
            )?)
        }
        None => Ok(text.unwrap_or_default()),
    }
}

/// Generates quizzes through a provider
#[derive(Clone)]
pub struct QuizGenerator {
    provider: Arc<dyn QuizProvider>,
    strict: bool,
}

impl QuizGenerator {
    pub fn new(provider: Arc<dyn QuizProvider>) -> Self {
        Self {
            provider,
            strict: true,
        }
    }

    /// Reject (strict) or only log (lenient) questions that break the shape rules
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Build the prompt, call the provider once, and validate the result
    #[instrument(skip(self, request), fields(mcq = request.num_mcq(), tf = request.num_tf(), difficulty = %request.difficulty()))]
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        let prompt = build_prompt(request);
        debug!(
            "Prompt built: {} chars, ~{} source tokens",
            prompt.text.len(),
            request.estimate_source_tokens()
        );

        let gemini_req = GeminiRequest::new(self.provider.model(), prompt.text)
            .with_response_schema(prompt.schema)
            .with_temperature(GENERATION_TEMPERATURE);

        let response = self.provider.generate(&gemini_req).await.map_err(|e| {
            warn!("Quiz generation call failed: {}", e);
            QuizError::from(e)
        })?;

        debug!("Provider returned ~{} tokens", response.estimate_output_tokens());

        let quiz = parse_quiz_response(&response.text)?;
        self.check_questions(&quiz)?;

        info!("Generated quiz with {} questions", quiz.len());
        Ok(quiz)
    }

    fn check_questions(&self, quiz: &Quiz) -> Result<(), QuizError> {
        let issues = quiz.issues();
        if issues.is_empty() {
            return Ok(());
        }

        for (idx, issue) in &issues {
            warn!("Question {}: {}", idx + 1, issue);
        }

        if self.strict {
            let (idx, issue) = &issues[0];
            return Err(QuizError::MalformedResponse(format!(
                "question {} {} ({} issue(s) in total)",
                idx + 1,
                issue,
                issues.len()
            )));
        }

        Ok(())
    }
}

/// Parse the provider's raw text into a quiz.
///
/// The top-level value must be an object with a `questions` array.
pub fn parse_quiz_response(raw: &str) -> Result<Quiz, QuizError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| QuizError::MalformedResponse(format!("response is not valid JSON: {}", e)))?;

    if !value.get("questions").is_some_and(Value::is_array) {
        return Err(QuizError::MalformedResponse(
            "expected an object with a 'questions' array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| QuizError::MalformedResponse(format!("unexpected question shape: {}", e)))
}
