//! Liveness and static image handlers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{ApiError, AppState};

/// Body returned by the liveness probe.
pub const HEALTH_BODY: &str = "Server working!";

/// Liveness probe. Never touches the store.
#[utoipa::path(get, path = "/", tag = "System",
    responses((status = 200, description = "Server is up", body = String, content_type = "text/plain")))]
pub async fn health() -> &'static str {
    HEALTH_BODY
}

/// Serve the configured illustration.
///
/// The content type is sniffed from the file's magic bytes.
#[utoipa::path(get, path = "/img", tag = "System",
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Image file missing"),
        (status = 500, description = "Image file unreadable")))]
pub async fn show_img(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = tokio::fs::read(&state.image_path).await.map_err(|e| {
        tracing::warn!(
            subsystem = "api",
            component = "system",
            path = %state.image_path.display(),
            error = %e,
            "Image unavailable"
        );
        match e.kind() {
            std::io::ErrorKind::NotFound => ApiError::NotFound("Image not found".to_string()),
            _ => ApiError::from(dissoc_core::Error::Io(e)),
        }
    })?;

    let mime = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
