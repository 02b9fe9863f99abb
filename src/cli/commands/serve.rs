//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for summaries, translations, notes and
//! related-video recommendations. Every request gets its own orchestrator,
//! so requests never share working state.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::{RecapError, Result};
use crate::llm::{create_generator, TextGenerator};
use crate::orchestrator::{recommend_with, Orchestrator};
use crate::search::{create_search, Recommendation, VideoSearch};
use crate::session::Session;
use crate::transcript::{TranscriptSource, YtDlpTranscriptSource};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

type GeneratorFactory =
    Arc<dyn Fn(&Settings, Option<&str>) -> Result<Arc<dyn TextGenerator>> + Send + Sync>;

/// Shared application state.
struct AppState {
    settings: Settings,
    prompts: Prompts,
    generators: GeneratorFactory,
    transcripts: Arc<dyn TranscriptSource>,
    search: Arc<dyn VideoSearch>,
}

impl AppState {
    fn from_settings(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let transcripts = Arc::new(YtDlpTranscriptSource::from_settings(&settings.transcript));
        let search = Arc::new(create_search(&settings.transcript.ytdlp_path, &settings.search));
        Ok(Self {
            settings,
            prompts,
            generators: Arc::new(|settings: &Settings, key: Option<&str>| {
                create_generator(&settings.llm, key)
            }),
            transcripts,
            search,
        })
    }

    /// Orchestrator for one request, using the request's key if it has one.
    fn orchestrator(&self, api_key: Option<&str>) -> Result<Orchestrator> {
        let generator = (self.generators)(&self.settings, api_key)?;
        Ok(Orchestrator::with_components(
            self.settings.clone(),
            self.prompts.clone(),
            generator,
            self.transcripts.clone(),
            self.search.clone(),
        ))
    }
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/summarize", post(summarize))
        .route("/translate", post(translate))
        .route("/notes", post(notes))
        .route("/recommendations", post(recommendations))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(settings)?);
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Summarize", "POST /summarize");
    Output::kv("Translate", "POST /translate");
    Output::kv("Notes", "POST /notes");
    Output::kv("Recommendations", "POST /recommendations");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Errors ===

/// A failed request, rendered as `{"error": ...}`.
struct ApiError(RecapError);

impl From<RecapError> for ApiError {
    fn from(err: RecapError) -> Self {
        ApiError(err)
    }
}

fn status_for(err: &RecapError) -> StatusCode {
    if err.is_rate_limited() {
        return StatusCode::TOO_MANY_REQUESTS;
    }
    if err.is_auth_failure() {
        return StatusCode::UNAUTHORIZED;
    }
    match err {
        RecapError::InvalidInput(_) | RecapError::InvalidCredential(_) => StatusCode::BAD_REQUEST,
        RecapError::NoTranscript(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            info!("Request rejected ({}): {}", status.as_u16(), self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SummarizeRequest {
    youtube_url: String,
    #[serde(default, alias = "groq_api_key")]
    api_key: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Deserialize)]
struct TranslateRequest {
    summary_text: String,
    target_language: String,
    #[serde(default, alias = "groq_api_key")]
    api_key: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct TranslateResponse {
    translation: String,
}

#[derive(Deserialize)]
struct NotesRequest {
    transcript_text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default, alias = "groq_api_key")]
    api_key: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct NotesResponse {
    notes: String,
}

#[derive(Deserialize)]
struct RecommendationsRequest {
    summary_text: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<RecommendationInfo>,
}

#[derive(Serialize, Deserialize)]
struct RecommendationInfo {
    title: String,
    url: String,
}

impl From<Recommendation> for RecommendationInfo {
    fn from(rec: Recommendation) -> Self {
        Self {
            title: rec.title,
            url: rec.url,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> std::result::Result<Json<SummarizeResponse>, ApiError> {
    let orchestrator = state.orchestrator(req.api_key.as_deref())?;
    let mut session = Session::new();
    let summary = orchestrator
        .summarize_video(&mut session, &req.youtube_url)
        .await?;
    Ok(Json(SummarizeResponse { summary: summary.text }))
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> std::result::Result<Json<TranslateResponse>, ApiError> {
    if req.summary_text.trim().is_empty() {
        return Err(RecapError::InvalidInput("summary_text is empty".to_string()).into());
    }
    let orchestrator = state.orchestrator(req.api_key.as_deref())?;
    let translation = orchestrator
        .translate_text(&req.summary_text, &req.target_language)
        .await?;
    Ok(Json(TranslateResponse { translation }))
}

async fn notes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotesRequest>,
) -> std::result::Result<Json<NotesResponse>, ApiError> {
    if req.transcript_text.trim().is_empty() {
        return Err(RecapError::InvalidInput("transcript_text is empty".to_string()).into());
    }
    let orchestrator = state.orchestrator(req.api_key.as_deref())?;
    let language = req
        .language
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(crate::orchestrator::DEFAULT_NOTES_LANGUAGE);
    let notes = orchestrator
        .notes_from_text(&req.transcript_text, language)
        .await?;
    Ok(Json(NotesResponse { notes }))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendationsRequest>,
) -> std::result::Result<Json<RecommendationsResponse>, ApiError> {
    let results = recommend_with(
        state.search.as_ref(),
        &state.settings,
        &req.summary_text,
        req.limit,
    )
    .await?;
    Ok(Json(RecommendationsResponse {
        recommendations: results.into_iter().map(RecommendationInfo::from).collect(),
    }))
}
