//! # REST API Interface Layer
//!
//! HTTP endpoints for the donation tracker. This layer translates between
//! JSON requests/responses and domain calls, maps domain failures to HTTP
//! statuses, and logs each request. No business logic lives here.

pub mod dashboard_apis;
pub mod disbursement_apis;
pub mod donation_apis;
pub mod donor_apis;
pub mod event_apis;
pub mod mutation_apis;
pub mod public_apis;
pub mod user_apis;

use serde::Deserialize;

/// Common list-screen query parameters: event scope, free-text search, and
/// the optional page window.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub event_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
