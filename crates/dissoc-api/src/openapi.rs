//! OpenAPI document for the HTTP surface, served at `/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::handlers;
use dissoc_core::{DiagnosticReport, LocationDissociation, TermDissociation};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "neurodissoc API",
        description = "Dissociations between neuroimaging study sets selected by term or by location"
    ),
    paths(
        handlers::system::health,
        handlers::system::show_img,
        handlers::stubs::terms_studies,
        handlers::stubs::locations_studies,
        handlers::diagnostics::test_db,
        handlers::dissociate::dissociate_terms,
        handlers::dissociate::dissociate_locations,
    ),
    components(schemas(TermDissociation, LocationDissociation, DiagnosticReport)),
    tags(
        (name = "System", description = "Liveness, image and store diagnostics"),
        (name = "Studies", description = "Placeholder study listings"),
        (name = "Dissociation", description = "Term and location dissociations")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
