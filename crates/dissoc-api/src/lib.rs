//! # dissoc-api
//!
//! HTTP surface of neurodissoc: a liveness probe, a static image, two
//! placeholder study listings, store diagnostics and the term and location
//! dissociation queries.
//!
//! The router is built by [`router`] so integration tests can serve it on an
//! ephemeral port against an in-memory store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod telemetry;

use axum::{routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use config::{AppConfig, LogConfig};
pub use error::ApiError;
pub use state::AppState;
pub use telemetry::{init_tracing, MakeRequestUuidV7};

use handlers::{diagnostics, dissociate, stubs, system};

/// Build the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::health))
        .route("/img", get(system::show_img))
        .route("/terms/:term/studies", get(stubs::terms_studies))
        .route("/locations/:coords/studies", get(stubs::locations_studies))
        .route("/test_db", get(diagnostics::test_db))
        .route(
            "/dissociate/terms/:term_a/:term_b",
            get(dissociate::dissociate_terms),
        )
        .route(
            "/dissociate/locations/:coords_a/:coords_b",
            get(dissociate::dissociate_locations),
        )
        .route("/openapi.json", get(openapi::openapi_json))
        // Middleware
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}
