use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServerSettings;
use crate::errors::Error;
use crate::guide::{VideoGuide, VideoReport};

/// Multipart field carrying the video.
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub guide: Arc<VideoGuide>,
}

impl AppState {
    pub fn new(guide: VideoGuide) -> Self {
        Self {
            guide: Arc::new(guide),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub summary: String,
    pub frames: Vec<String>,
}

impl From<VideoReport> for UploadResponse {
    fn from(report: VideoReport) -> Self {
        Self {
            summary: report.summary,
            frames: report.frames.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub model_backend: String,
    pub video_cached: bool,
    pub timestamp: DateTime<Utc>,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/upload_video", post(upload_video))
        .route("/ask_question", post(ask_question))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_backend = match state.guide.model_health().await {
        Ok(true) => "reachable",
        Ok(false) => "unhealthy",
        Err(e) => {
            warn!("Model backend health check failed: {}", e);
            "unreachable"
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.guide.model_name().to_string(),
        model_backend: model_backend.to_string(),
        video_cached: !state.guide.store().is_empty().await,
        timestamp: Utc::now(),
    })
}

async fn upload_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, Error> {
    let multipart = multipart?;
    let upload_id = Uuid::new_v4();
    receive_video(state, multipart)
        .instrument(info_span!("upload", %upload_id))
        .await
}

async fn receive_video(
    state: AppState,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, Error> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        info!("Received file: {:?}", field.file_name().unwrap_or("<unnamed>"));
        let content_type = field.content_type().unwrap_or_default();
        if !content_type.starts_with("video/") {
            warn!("Uploaded file is not a video: {:?}", content_type);
            return Err(Error::bad_request("Uploaded file must be a video."));
        }

        let video = field.bytes().await?;
        let report = state.guide.describe_video(video.to_vec()).await?;
        info!("Video analysed into {} frame description(s)", report.frames.len());

        return Ok(Json(UploadResponse::from(report)));
    }

    Err(Error::bad_request(format!(
        "Missing `{UPLOAD_FIELD}` field in multipart upload."
    )))
}

async fn ask_question(
    State(state): State<AppState>,
    request: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, Error> {
    let Json(request) = request?;
    let answer = state.guide.answer_question(&request.question).await?;
    Ok(Json(AnswerResponse { answer }))
}

pub async fn serve(state: AppState, settings: &ServerSettings) -> Result<()> {
    let app = create_router(state, settings.max_upload_bytes);

    let addr = settings.bind_addr();
    info!("REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server");
}
