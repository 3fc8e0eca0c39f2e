//! HTTP handlers.
//!
//! Document handlers load the render context (fetching the feed on the first
//! request), then compose and write the PDF on the blocking pool.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use log::info;

use super::dto::{DocumentInfoDto, DocumentListResponse, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::services::{render_document, DocumentKind};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schedule_loaded: state.is_loaded(),
    }))
}

// =============================================================================
// Documents
// =============================================================================

/// GET /documents
pub async fn list_documents() -> HandlerResult<DocumentListResponse> {
    let documents = DocumentKind::ALL
        .iter()
        .map(|kind| DocumentInfoDto {
            name: kind.to_string(),
            file_name: kind.file_name().to_string(),
        })
        .collect();
    Ok(Json(DocumentListResponse { documents }))
}

/// GET /documents/{name}
pub async fn get_document(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let kind: DocumentKind = name.parse().map_err(AppError::NotFound)?;
    render(state, kind).await
}

/// GET /programme.pdf
pub async fn get_programme(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, DocumentKind::FullProgramme).await
}

/// GET /salles.pdf
pub async fn get_room_schedules(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, DocumentKind::RoomSchedules).await
}

/// GET /mini.pdf
pub async fn get_mini_table(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, DocumentKind::MiniTable).await
}

/// GET /mini-text.pdf
pub async fn get_mini_text(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, DocumentKind::MiniText).await
}

async fn render(state: AppState, kind: DocumentKind) -> Result<Response, AppError> {
    let ctx = state.context().await?;
    let bytes = tokio::task::spawn_blocking(move || render_document(&ctx, kind))
        .await
        .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;

    info!("Served {} ({} bytes)", kind.file_name(), bytes.len());
    let disposition = format!("inline; filename=\"{}\"", kind.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
