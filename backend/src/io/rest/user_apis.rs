//! # REST API for User Management
//!
//! The route gate already guaranteed a session; every mutating endpoint here
//! additionally requires the caller's profile to carry the admin role, and
//! delete refuses the caller's own account.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use shared::{CreateUserRequest, IdResponse, Profile, UpdateUserRequest, UserListResponse};

use crate::auth::Session;
use crate::error::ApiError;
use crate::AppState;

/// The caller's own profile.
pub async fn profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Profile>, ApiError> {
    info!("GET /api/admin/profile - user: {}", session.user_id);

    let profile = state
        .users
        .profile(&session)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(profile))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserListResponse>, ApiError> {
    info!("GET /api/admin/users - user: {}", session.user_id);

    state
        .users
        .ensure_admin(&session)
        .await
        .map_err(ApiError::from_domain)?;
    let response = state.users.list().await.map_err(ApiError::from_domain)?;
    Ok(Json(response))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    info!("POST /api/admin/users - email: {}", request.email);

    state
        .users
        .ensure_admin(&session)
        .await
        .map_err(ApiError::from_domain)?;
    let profile = state
        .users
        .create(request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Profile>, ApiError> {
    info!("PUT /api/admin/users/{}", user_id);

    state
        .users
        .ensure_admin(&session)
        .await
        .map_err(ApiError::from_domain)?;
    let profile = state
        .users
        .update(&user_id, request)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(profile))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
) -> Result<Json<IdResponse>, ApiError> {
    info!("DELETE /api/admin/users/{}", user_id);

    state
        .users
        .ensure_admin(&session)
        .await
        .map_err(ApiError::from_domain)?;
    state
        .users
        .delete(&user_id, &session)
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(IdResponse { id: user_id }))
}
