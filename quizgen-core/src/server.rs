//! HTTP server for the Quizgen API.
//!
//! Provides `POST /api/generate` (multipart upload or pasted text), a
//! download-style export endpoint, health and OpenAPI discovery.

use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::model::{ApiError, Difficulty, HealthResponse, Quiz, QuizRequest};
use crate::quiz::{resolve_source, QuizError, QuizGenerator, SourceFile};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

const UPLOAD_FAILED: &str = "Failed to process the uploaded file.";
const GENERATION_FAILED: &str =
    "Failed to generate quiz. The model may have returned an invalid format.";

/// OpenAPI documentation for the Quizgen API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quizgen API",
        version = "0.1.0",
        description = "Generate multiple-choice and true/false quizzes from pasted text, \
                       plain-text files or PDFs using Gemini.",
        license(name = "MIT"),
        contact(name = "Quizgen Contributors")
    ),
    servers(
        (url = "http://127.0.0.1:3001", description = "Local development server")
    ),
    paths(generate_quiz, export_quiz, health_check),
    components(schemas(
        crate::model::Quiz,
        crate::model::Question,
        crate::model::QuestionType,
        crate::model::Difficulty,
        crate::model::ApiError,
        crate::model::HealthResponse,
        GenerateForm,
    )),
    tags(
        (name = "Quiz", description = "Quiz generation and export"),
        (name = "Health", description = "Server health and status")
    )
)]
pub struct ApiDoc;

/// Multipart form accepted by `POST /api/generate`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct GenerateForm {
    /// Plain-text or PDF upload; takes precedence over `sourceText`
    #[schema(format = Binary, value_type = Option<String>)]
    source_file: Option<Vec<u8>>,
    source_text: Option<String>,
    #[serde(rename = "numMCQ")]
    num_mcq: Option<u32>,
    #[serde(rename = "numTF")]
    num_tf: Option<u32>,
    difficulty: Option<Difficulty>,
}

/// Shared application state
pub struct AppState {
    pub generator: QuizGenerator,
    pub config: Config,
}

impl AppState {
    pub fn new(generator: QuizGenerator, config: Config) -> Self {
        Self { generator, config }
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/api/generate", post(generate_quiz))
        .route("/api/export/:format", post(export_quiz))
        .route("/openapi.json", get(openapi_json))
        .route("/health", get(health_check))
        .route("/", get(root))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// OpenAPI JSON document endpoint
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Root endpoint - discovery information
async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Quizgen",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.generator.model(),
        "endpoints": {
            "generate": { "path": "/api/generate", "method": "POST" },
            "export": { "path": "/api/export/{json|txt}", "method": "POST" },
            "health": { "path": "/health", "method": "GET" },
            "openapi": { "path": "/openapi.json", "method": "GET" }
        }
    }))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server health status", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.generator.model().to_string(),
    })
}

/// Fields collected from the multipart form
#[derive(Debug, Default)]
struct GenerateFields {
    file: Option<SourceFile>,
    source_text: Option<String>,
    num_mcq: Option<String>,
    num_tf: Option<String>,
    difficulty: Option<String>,
}

/// Body-limit rejections become 413; anything else goes through `other`
fn multipart_error(
    e: MultipartError,
    limit: usize,
    other: impl FnOnce(MultipartError) -> AppError,
) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected request body over {} bytes", limit);
        AppError::PayloadTooLarge(limit)
    } else {
        other(e)
    }
}

async fn read_form(mut multipart: Multipart, limit: usize) -> Result<GenerateFields, AppError> {
    let mut fields = GenerateFields::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        multipart_error(e, limit, |e| {
            AppError::InvalidRequest(format!("Invalid multipart body: {}", e))
        })
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "sourceFile" => {
                let file_name = field.file_name().map(str::to_string);
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    multipart_error(e, limit, |e| {
                        error!("Error reading uploaded file: {}", e);
                        AppError::Quiz(QuizError::UnreadableFile(e.to_string()))
                    })
                })?;
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() || file_name.as_deref().is_some_and(|n| !n.is_empty()) {
                    fields.file = Some(SourceFile {
                        bytes: bytes.to_vec(),
                        mime_type,
                        file_name,
                    });
                }
            }
            "sourceText" | "numMCQ" | "numTF" | "difficulty" => {
                let value = field.text().await.map_err(|e| {
                    multipart_error(e, limit, |e| {
                        AppError::InvalidRequest(format!("Invalid field '{}': {}", name, e))
                    })
                })?;
                match name.as_str() {
                    "sourceText" => fields.source_text = Some(value),
                    "numMCQ" => fields.num_mcq = Some(value),
                    "numTF" => fields.num_tf = Some(value),
                    _ => fields.difficulty = Some(value),
                }
            }
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(fields)
}

/// Parse a question count, falling back to `default` when blank
fn parse_count(field: &str, raw: Option<&str>, default: u32, max: u32) -> Result<u32, QuizError> {
    let count = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse::<u32>().map_err(|_| {
            QuizError::InvalidParameter(format!(
                "Invalid value for {}: '{}'. Expected a whole number.",
                field, s
            ))
        })?,
    };

    if count > max {
        return Err(QuizError::InvalidParameter(format!(
            "{} must be at most {}.",
            field, max
        )));
    }
    Ok(count)
}

/// Generate a quiz from an uploaded file or pasted text
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "Quiz",
    request_body(content = GenerateForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Generated quiz", body = Quiz),
        (status = 400, description = "Missing or invalid input", body = ApiError),
        (status = 500, description = "Upload or generation failure", body = ApiError)
    )
)]
#[instrument(skip(state, multipart))]
async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Quiz>, AppError> {
    let fields = read_form(multipart, state.config.server.max_upload_bytes).await?;
    debug!(
        "Received generate request (file: {}, text: {})",
        fields.file.is_some(),
        fields.source_text.is_some()
    );

    let source_text = resolve_source(fields.file.as_ref(), fields.source_text)?;

    let limits = &state.config.generation;
    let num_mcq = parse_count(
        "numMCQ",
        fields.num_mcq.as_deref(),
        limits.default_mcq,
        limits.max_questions_per_type,
    )?;
    let num_tf = parse_count(
        "numTF",
        fields.num_tf.as_deref(),
        limits.default_tf,
        limits.max_questions_per_type,
    )?;
    let difficulty = match fields.difficulty.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => d.parse::<Difficulty>()?,
        _ => limits.default_difficulty,
    };

    let request = QuizRequest::new(source_text, num_mcq, num_tf, difficulty)?;
    let quiz = state.generator.generate(&request).await?;

    info!("Quiz generation successful ({} questions)", quiz.len());
    Ok(Json(quiz))
}

/// Export a quiz as a downloadable file
#[utoipa::path(
    post,
    path = "/api/export/{format}",
    tag = "Quiz",
    params(("format" = String, Path, description = "Export format: json or txt")),
    request_body = Quiz,
    responses(
        (status = 200, description = "Export file as an attachment"),
        (status = 400, description = "Unknown format", body = ApiError)
    )
)]
async fn export_quiz(
    Path(format): Path<String>,
    Json(quiz): Json<Quiz>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse().map_err(AppError::InvalidRequest)?;
    let file = export::export(&quiz, format).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.content,
    )
        .into_response())
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    PayloadTooLarge(usize),
    Quiz(QuizError),
    Internal(String),
}

impl From<QuizError> for AppError {
    fn from(e: QuizError) -> Self {
        AppError::Quiz(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new(msg)),
            AppError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError::new(format!(
                    "The upload is too large. The limit is {} bytes.",
                    limit
                )),
            ),
            AppError::Quiz(e) => match e {
                QuizError::InputMissing(msg)
                | QuizError::InvalidParameter(msg)
                | QuizError::UnsupportedFileType(msg) => {
                    (StatusCode::BAD_REQUEST, ApiError::new(msg))
                }
                QuizError::UnreadableFile(msg) => {
                    error!("Error processing file: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, ApiError::new(UPLOAD_FAILED))
                }
                QuizError::GenerationFailed(msg) => {
                    error!("Error generating quiz with Gemini: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new(GENERATION_FAILED).with_detail(msg),
                    )
                }
                QuizError::MalformedResponse(msg) => {
                    warn!("Gemini returned an unusable quiz: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new(GENERATION_FAILED),
                    )
                }
            },
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("Internal server error."),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Start the HTTP server
pub async fn start_server(state: Arc<AppState>) -> Result<(), std::io::Error> {
    let addr = state.config.server_addr();
    let router = create_router(state);

    info!("Starting Quizgen server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
