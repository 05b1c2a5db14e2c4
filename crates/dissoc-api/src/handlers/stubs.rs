//! Placeholder study listing routes.
//!
//! These echo their path parameter and do not query the store.

use axum::{extract::Path, Json};

use crate::ApiError;

/// Echo the term.
#[utoipa::path(get, path = "/terms/{term}/studies", tag = "Studies",
    params(("term" = String, Path, description = "Term")),
    responses((status = 200, description = "Echoed term", body = String, content_type = "text/plain")))]
pub async fn terms_studies(Path(term): Path<String>) -> String {
    term
}

/// Echo the integer coordinate triple as a JSON array.
#[utoipa::path(get, path = "/locations/{coords}/studies", tag = "Studies",
    params(("coords" = String, Path, description = "Integer coordinates as x_y_z")),
    responses(
        (status = 200, description = "Echoed coordinates", body = Vec<i64>),
        (status = 400, description = "Malformed coordinates")))]
pub async fn locations_studies(Path(coords): Path<String>) -> Result<Json<[i64; 3]>, ApiError> {
    Ok(Json(dissoc_core::parse_integer_triple(&coords)?))
}
