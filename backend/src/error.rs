//! Error types for the REST boundary.
//!
//! Domain and storage code propagate `anyhow::Result`; validation and
//! missing-row conditions are raised as typed `DomainError`s inside that
//! chain so the HTTP layer can map them back to 400/404 instead of a blanket
//! 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures a domain service can signal deliberately.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),
}

/// Error shape returned by every handler.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Recover the deliberate domain failures out of an `anyhow` chain.
    pub fn from_domain(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::BadRequest(msg.clone()),
            Some(DomainError::NotFound(what)) => ApiError::NotFound(format!("{} not found", what)),
            Some(DomainError::Forbidden(msg)) => ApiError::Forbidden(msg.clone()),
            None => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {:?}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
