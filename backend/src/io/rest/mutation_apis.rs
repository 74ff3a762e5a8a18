//! # REST API for Fund Mutations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use shared::{
    CreateFundMutationRequest, FundMutation, FundMutationListResponse, IdResponse,
    UpdateFundMutationRequest,
};

use crate::error::ApiError;
use crate::io::rest::ListQuery;
use crate::AppState;

pub async fn list_mutations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<FundMutationListResponse>, ApiError> {
    info!("GET /api/admin/mutations - query: {:?}", query);

    let response = state
        .mutations
        .list(query.event_id.as_deref(), query.page, query.per_page)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(response))
}

pub async fn create_mutation(
    State(state): State<AppState>,
    Json(request): Json<CreateFundMutationRequest>,
) -> Result<(StatusCode, Json<FundMutation>), ApiError> {
    info!("POST /api/admin/mutations - request: {:?}", request);

    let mutation = state
        .mutations
        .create(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(mutation)))
}

pub async fn get_mutation(
    State(state): State<AppState>,
    Path(mutation_id): Path<String>,
) -> Result<Json<FundMutation>, ApiError> {
    info!("GET /api/admin/mutations/{}", mutation_id);

    let mutation = state
        .mutations
        .get(&mutation_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(mutation))
}

pub async fn update_mutation(
    State(state): State<AppState>,
    Path(mutation_id): Path<String>,
    Json(request): Json<UpdateFundMutationRequest>,
) -> Result<Json<FundMutation>, ApiError> {
    info!(
        "PUT /api/admin/mutations/{} - request: {:?}",
        mutation_id, request
    );

    let mutation = state
        .mutations
        .update(&mutation_id, request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(mutation))
}

pub async fn delete_mutation(
    State(state): State<AppState>,
    Path(mutation_id): Path<String>,
) -> Result<Json<IdResponse>, ApiError> {
    info!("DELETE /api/admin/mutations/{}", mutation_id);

    state
        .mutations
        .delete(&mutation_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(IdResponse { id: mutation_id }))
}
