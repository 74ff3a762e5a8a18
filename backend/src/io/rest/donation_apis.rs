//! # REST API for Donation Management
//!
//! List/create/edit/delete plus the CSV report download.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use shared::{
    CreateDonationRequest, Donation, DonationListResponse, IdResponse, UpdateDonationRequest,
};

use crate::error::ApiError;
use crate::io::rest::ListQuery;
use crate::AppState;

pub async fn list_donations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DonationListResponse>, ApiError> {
    info!("GET /api/admin/donations - query: {:?}", query);

    let response = state
        .donations
        .list(
            query.event_id.as_deref(),
            query.search.as_deref(),
            query.page,
            query.per_page,
        )
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(response))
}

pub async fn create_donation(
    State(state): State<AppState>,
    Json(request): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>), ApiError> {
    info!("POST /api/admin/donations - request: {:?}", request);

    let donation = state
        .donations
        .create(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(donation)))
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<String>,
) -> Result<Json<Donation>, ApiError> {
    info!("GET /api/admin/donations/{}", donation_id);

    let donation = state
        .donations
        .get(&donation_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(donation))
}

pub async fn update_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<String>,
    Json(request): Json<UpdateDonationRequest>,
) -> Result<Json<Donation>, ApiError> {
    info!(
        "PUT /api/admin/donations/{} - request: {:?}",
        donation_id, request
    );

    let donation = state
        .donations
        .update(&donation_id, request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(donation))
}

pub async fn delete_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<String>,
) -> Result<Json<IdResponse>, ApiError> {
    info!("DELETE /api/admin/donations/{}", donation_id);

    state
        .donations
        .delete(&donation_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(IdResponse { id: donation_id }))
}

/// Download the filtered donation list as CSV.
pub async fn export_donations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/admin/donations/export - query: {:?}", query);

    let listed = state
        .donations
        .list(query.event_id.as_deref(), query.search.as_deref(), None, None)
        .await
        .map_err(ApiError::from_domain)?;
    let export = state
        .export
        .donations(&listed.donations)
        .map_err(ApiError::from_domain)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    ))
}
