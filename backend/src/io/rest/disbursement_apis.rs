//! # REST API for Disbursement Management

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::info;

use shared::{
    CreateDisbursementRequest, Disbursement, DisbursementListResponse, IdResponse,
    UpdateDisbursementRequest,
};

use crate::error::ApiError;
use crate::io::rest::ListQuery;
use crate::AppState;

pub async fn list_disbursements(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DisbursementListResponse>, ApiError> {
    info!("GET /api/admin/disbursements - query: {:?}", query);

    let response = state
        .disbursements
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

pub async fn create_disbursement(
    State(state): State<AppState>,
    Json(request): Json<CreateDisbursementRequest>,
) -> Result<(StatusCode, Json<Disbursement>), ApiError> {
    info!("POST /api/admin/disbursements - request: {:?}", request);

    let disbursement = state
        .disbursements
        .create(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(disbursement)))
}

pub async fn get_disbursement(
    State(state): State<AppState>,
    Path(disbursement_id): Path<String>,
) -> Result<Json<Disbursement>, ApiError> {
    info!("GET /api/admin/disbursements/{}", disbursement_id);

    let disbursement = state
        .disbursements
        .get(&disbursement_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(disbursement))
}

pub async fn update_disbursement(
    State(state): State<AppState>,
    Path(disbursement_id): Path<String>,
    Json(request): Json<UpdateDisbursementRequest>,
) -> Result<Json<Disbursement>, ApiError> {
    info!(
        "PUT /api/admin/disbursements/{} - request: {:?}",
        disbursement_id, request
    );

    let disbursement = state
        .disbursements
        .update(&disbursement_id, request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(disbursement))
}

pub async fn delete_disbursement(
    State(state): State<AppState>,
    Path(disbursement_id): Path<String>,
) -> Result<Json<IdResponse>, ApiError> {
    info!("DELETE /api/admin/disbursements/{}", disbursement_id);

    state
        .disbursements
        .delete(&disbursement_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(IdResponse { id: disbursement_id }))
}

/// Download the filtered disbursement list as CSV.
pub async fn export_disbursements(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/admin/disbursements/export - query: {:?}", query);

    let listed = state
        .disbursements
        .list(query.event_id.as_deref(), query.search.as_deref(), None, None)
        .await
        .map_err(ApiError::from_domain)?;
    let export = state
        .export
        .disbursements(&listed.disbursements)
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
