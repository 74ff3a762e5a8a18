//! Donor directory endpoints backing the donation form's search box and the
//! explicit add-donor flow.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use shared::{CreateDonorRequest, Donor, DonorListResponse};

use crate::error::ApiError;
use crate::io::rest::ListQuery;
use crate::AppState;

pub async fn list_donors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DonorListResponse>, ApiError> {
    info!("GET /api/admin/donors - query: {:?}", query);

    let response = state
        .donations
        .list_donors(query.search.as_deref())
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(response))
}

pub async fn create_donor(
    State(state): State<AppState>,
    Json(request): Json<CreateDonorRequest>,
) -> Result<(StatusCode, Json<Donor>), ApiError> {
    info!("POST /api/admin/donors - request: {:?}", request);

    let donor = state
        .donations
        .create_donor(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(donor)))
}
