use axum::{extract::State, http::StatusCode, Extension, Json};
use common::RequestContext;
use service::health::HealthReport;

use crate::state::AppState;

/// Composite dependency status; 200 only when every enabled dependency is UP.
#[utoipa::path(get, path = "/health", tag = "health", responses(
    (status = 200, description = "All dependencies up", body = crate::openapi::HealthReportDoc),
    (status = 503, description = "Degraded or down", body = crate::openapi::HealthReportDoc),
))]
pub async fn health(State(state): State<AppState>, Extension(ctx): Extension<RequestContext>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check(&ctx).await;
    let status = if report.is_up() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(report))
}
