//! Admin dashboard endpoint.

use axum::{extract::State, Json};
use tracing::info;

use shared::DashboardResponse;

use crate::error::ApiError;
use crate::AppState;

/// Headline counters plus the latest recorded donations.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    info!("GET /api/admin/dashboard");

    let dashboard = state
        .stats
        .dashboard()
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(dashboard))
}
