//! Public page endpoints: live stats and the donation feed for the active
//! event. No session required.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use shared::{PublicFeedResponse, PublicSummaryResponse};

use crate::domain::feed::FeedWindow;
use crate::error::ApiError;
use crate::AppState;

/// Active event and its donation totals.
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<PublicSummaryResponse>, ApiError> {
    info!("GET /api/public/summary");

    let summary = state
        .stats
        .public_summary()
        .await
        .map_err(ApiError::from_domain)?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// 1-based page; omitted means the short first-page preview.
    pub page: Option<u32>,
}

/// The ranked, deduplicated, redacted donation feed.
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<PublicFeedResponse>, ApiError> {
    info!("GET /api/public/feed - page: {:?}", query.page);

    let window = match query.page {
        Some(page) => FeedWindow::Page(page),
        None => FeedWindow::Preview,
    };

    let entries = match state.events.active().await.map_err(ApiError::from_domain)? {
        Some(event) => state
            .feed
            .window(&event.id, window)
            .await
            .map_err(ApiError::from_domain)?,
        // No active event: an empty feed, not an error.
        None => Vec::new(),
    };

    Ok(Json(PublicFeedResponse {
        entries,
        page: query.page.unwrap_or(1),
    }))
}
