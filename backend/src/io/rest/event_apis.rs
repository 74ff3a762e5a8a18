//! # REST API for Event Management
//!
//! Endpoints for listing, creating, editing and toggling fundraising
//! events. There is no delete: events are closed, never removed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use shared::{CreateEventRequest, Event, EventListResponse, UpdateEventRequest};

use crate::error::ApiError;
use crate::io::rest::ListQuery;
use crate::AppState;

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EventListResponse>, ApiError> {
    info!("GET /api/admin/events - query: {:?}", query);

    let response = state
        .events
        .list(query.search.as_deref(), query.page, query.per_page)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(response))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    info!("POST /api/admin/events - request: {:?}", request);

    let event = state
        .events
        .create(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    info!("GET /api/admin/events/{}", event_id);

    let event = state
        .events
        .get(&event_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    info!("PUT /api/admin/events/{} - request: {:?}", event_id, request);

    let event = state
        .events
        .update(&event_id, request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(event))
}

pub async fn toggle_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    info!("POST /api/admin/events/{}/toggle", event_id);

    let event = state
        .events
        .toggle_active(&event_id)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(event))
}
