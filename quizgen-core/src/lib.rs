//! # Quizgen Core
//!
//! Core library for Quizgen - turn study material into quizzes with Gemini.
//!
//! This crate provides:
//! - Configuration management
//! - Source extraction from plain text and PDF uploads
//! - Prompt and structured-output schema construction
//! - Gemini REST client
//! - Quiz parsing, validation and export
//! - HTTP API server
//! - Shared data models

pub mod config;
pub mod export;
pub mod extract;
pub mod gemini;
pub mod model;
pub mod pdf;
pub mod prompt;
pub mod quiz;
pub mod server;

pub use config::{Config, ConfigError, GenerationConfig, GeminiConfig, ServerConfig};
pub use export::{ExportFormat, Export};
pub use extract::{ExtractError, SourceKind};
pub use gemini::{GeminiClient, GeminiError, GeminiRequest, GeminiResponse};
pub use model::*;
pub use prompt::{build_prompt, QuizPrompt};
pub use quiz::{QuizError, QuizGenerator, QuizProvider, SourceFile};
pub use server::{create_router, start_server, AppState};
