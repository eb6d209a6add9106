//! `quizgen serve` command - Run the HTTP API

use anyhow::Result;
use quizgen_core::{server, Config, GeminiClient, QuizGenerator};
use std::sync::Arc;
use tracing::info;

pub async fn run(config: Config) -> Result<()> {
    info!("Starting Quizgen server...");

    // Missing API key is fatal here, before anything binds
    let client = GeminiClient::from_config(&config.gemini)?;
    let generator = QuizGenerator::new(Arc::new(client))
        .with_strict_validation(config.generation.strict_validation);

    let state = Arc::new(server::AppState::new(generator, config.clone()));

    println!("🚀 Quizgen server starting on {}", config.server_url());
    println!("   Generate:  POST {}/api/generate", config.server_url());
    println!("   Export:    POST {}/api/export/{{json|txt}}", config.server_url());
    println!("   OpenAPI:   {}/openapi.json", config.server_url());
    println!("   Model:     {}", config.gemini.model);
    println!("   Press Ctrl+C to stop");

    server::start_server(state).await?;

    Ok(())
}
