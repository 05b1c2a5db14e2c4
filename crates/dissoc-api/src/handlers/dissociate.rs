//! Dissociation handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{ApiError, AppState};
use dissoc_core::{parse_radius, LocationDissociation, Point3, TermDissociation};

/// First value of the `r` query parameter, if any.
///
/// Query pairs are taken raw so that a repeated or unparsable `r` never
/// rejects the request; only the first occurrence counts.
pub fn first_radius_param(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == "r")
        .map(|(_, value)| value.as_str())
}

/// Studies associated with one term but not the other.
///
/// # Returns
/// - 200 OK with both set differences, ascending
/// - 500 Internal Server Error if the store fails
#[utoipa::path(get, path = "/dissociate/terms/{term_a}/{term_b}", tag = "Dissociation",
    params(
        ("term_a" = String, Path, description = "First term"),
        ("term_b" = String, Path, description = "Second term")),
    responses(
        (status = 200, description = "Dissociation", body = TermDissociation),
        (status = 500, description = "Store failure")))]
pub async fn dissociate_terms(
    State(state): State<AppState>,
    Path((term_a, term_b)): Path<(String, String)>,
) -> Result<Json<TermDissociation>, ApiError> {
    let result = state.engine.by_terms(&term_a, &term_b).await?;
    Ok(Json(result))
}

/// Studies reported near one point but not near the other.
///
/// # Query Parameters
/// - `r`: search radius (default 6; unparsable values use the default, and
///   only the first `r` counts when repeated)
///
/// # Returns
/// - 200 OK with both set differences, ascending
/// - 400 Bad Request if either coordinate is malformed (the store is not queried)
/// - 500 Internal Server Error if the store fails
#[utoipa::path(get, path = "/dissociate/locations/{coords_a}/{coords_b}", tag = "Dissociation",
    params(
        ("coords_a" = String, Path, description = "First point as x_y_z"),
        ("coords_b" = String, Path, description = "Second point as x_y_z"),
        ("r" = Option<String>, Query, description = "Search radius, default 6")),
    responses(
        (status = 200, description = "Dissociation", body = LocationDissociation),
        (status = 400, description = "Malformed coordinates"),
        (status = 500, description = "Store failure")))]
pub async fn dissociate_locations(
    State(state): State<AppState>,
    Path((coords_a, coords_b)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<LocationDissociation>, ApiError> {
    let a: Point3 = coords_a.parse()?;
    let b: Point3 = coords_b.parse()?;
    let radius = parse_radius(first_radius_param(&pairs));

    let result = state.engine.by_locations(a, b, radius).await?;
    Ok(Json(result))
}
