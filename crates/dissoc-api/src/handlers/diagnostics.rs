//! Store diagnostics handler.

use axum::{extract::State, http::StatusCode, Json};

use crate::AppState;
use dissoc_core::DiagnosticReport;

/// Report connectivity, table counts and samples of the study store.
///
/// On failure the status is 500 and the body keeps whatever was collected
/// before the failure, plus `error`.
#[utoipa::path(get, path = "/test_db", tag = "System",
    responses(
        (status = 200, description = "Store reachable", body = dissoc_core::DiagnosticReport),
        (status = 500, description = "Store unreachable or schema missing",
            body = dissoc_core::DiagnosticReport)))]
pub async fn test_db(State(state): State<AppState>) -> (StatusCode, Json<DiagnosticReport>) {
    let report = state.diagnostics.run_diagnostics().await;
    if report.ok {
        return (StatusCode::OK, Json(report));
    }

    tracing::error!(
        subsystem = "api",
        component = "diagnostics",
        error = report.error.as_deref().unwrap_or("unknown"),
        "Diagnostics failed"
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Json(report))
}
