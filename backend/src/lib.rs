//! # Donation Tracker Backend
//!
//! Web service for a charitable foundation's donation management: an admin
//! API for recording donations, disbursements, events, inter-account fund
//! mutations and user accounts, plus a public API serving live fundraising
//! totals and the donation feed of the active event.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, access gate)
//!     ↓
//! Domain Layer (services, feed assembler, reducers)
//!     ↓
//! Storage Layer (SQLite via sqlx, one repository per entity)
//! ```

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::auth::{AuthGateway, InMemoryAuthGateway};
use crate::config::Config;
use crate::domain::{
    DisbursementService, DonationService, EventService, ExportService, FeedService,
    MutationService, StatsService, UserService,
};
use crate::io::rest;
use crate::storage::{
    DbConnection, DisbursementRepository, DonorRepository, EventRepository, MutationRepository,
    ProfileRepository, TransactionRepository,
};

/// Main application state holding all services. Constructed once at startup
/// and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub donations: DonationService,
    pub disbursements: DisbursementService,
    pub mutations: MutationService,
    pub users: UserService,
    pub feed: FeedService,
    pub stats: StatsService,
    pub export: ExportService,
    pub auth: Arc<dyn AuthGateway>,
}

fn build_state(db: DbConnection, auth: Arc<dyn AuthGateway>, pinned_donor: String) -> AppState {
    let events_repo = EventRepository::new(db.clone());
    let donors_repo = DonorRepository::new(db.clone());
    let transactions_repo = TransactionRepository::new(db.clone());
    let disbursements_repo = DisbursementRepository::new(db.clone());
    let mutations_repo = MutationRepository::new(db.clone());
    let profiles_repo = ProfileRepository::new(db);

    AppState {
        events: EventService::new(events_repo.clone()),
        donations: DonationService::new(
            transactions_repo.clone(),
            donors_repo.clone(),
            events_repo.clone(),
        ),
        disbursements: DisbursementService::new(
            disbursements_repo,
            transactions_repo.clone(),
            events_repo.clone(),
        ),
        mutations: MutationService::new(mutations_repo, events_repo.clone()),
        users: UserService::new(profiles_repo, auth.clone()),
        feed: FeedService::new(transactions_repo.clone(), pinned_donor),
        stats: StatsService::new(events_repo, donors_repo, transactions_repo),
        export: ExportService::new(),
        auth,
    }
}

/// Initialize the backend with all required services.
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up auth gateway");
    let gateway = Arc::new(InMemoryAuthGateway::new());
    if let (Some(token), Some(user_id)) = (&config.admin_session_token, &config.admin_user_id) {
        gateway.insert_session(token, user_id);
        info!("seeded admin session for user {}", user_id);
    }

    info!("Setting up application state");
    Ok(build_state(db, gateway, config.pinned_donor.clone()))
}

/// Create the Axum router with all routes configured.
pub fn create_router(state: AppState, config: &Config) -> Router {
    // CORS setup to allow the admin SPA to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/summary", get(rest::public_apis::summary))
        .route("/feed", get(rest::public_apis::feed));

    let admin_routes = Router::new()
        .route("/dashboard", get(rest::dashboard_apis::dashboard))
        .route("/profile", get(rest::user_apis::profile))
        .route(
            "/events",
            get(rest::event_apis::list_events).post(rest::event_apis::create_event),
        )
        .route(
            "/events/:id",
            get(rest::event_apis::get_event).put(rest::event_apis::update_event),
        )
        .route("/events/:id/toggle", post(rest::event_apis::toggle_event))
        .route(
            "/donations",
            get(rest::donation_apis::list_donations).post(rest::donation_apis::create_donation),
        )
        .route(
            "/donations/export",
            get(rest::donation_apis::export_donations),
        )
        .route(
            "/donations/:id",
            get(rest::donation_apis::get_donation)
                .put(rest::donation_apis::update_donation)
                .delete(rest::donation_apis::delete_donation),
        )
        .route(
            "/donors",
            get(rest::donor_apis::list_donors).post(rest::donor_apis::create_donor),
        )
        .route(
            "/disbursements",
            get(rest::disbursement_apis::list_disbursements)
                .post(rest::disbursement_apis::create_disbursement),
        )
        .route(
            "/disbursements/export",
            get(rest::disbursement_apis::export_disbursements),
        )
        .route(
            "/disbursements/:id",
            get(rest::disbursement_apis::get_disbursement)
                .put(rest::disbursement_apis::update_disbursement)
                .delete(rest::disbursement_apis::delete_disbursement),
        )
        .route(
            "/mutations",
            get(rest::mutation_apis::list_mutations).post(rest::mutation_apis::create_mutation),
        )
        .route(
            "/mutations/:id",
            get(rest::mutation_apis::get_mutation)
                .put(rest::mutation_apis::update_mutation)
                .delete(rest::mutation_apis::delete_mutation),
        )
        .route(
            "/users",
            get(rest::user_apis::list_users).post(rest::user_apis::create_user),
        )
        .route(
            "/users/:id",
            axum::routing::put(rest::user_apis::update_user).delete(rest::user_apis::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_session,
        ));

    Router::new()
        .nest("/api/public", public_routes)
        .nest("/api/admin", admin_routes)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::page_gate,
        ))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use shared::Role;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            port: 0,
            database_url: String::new(),
            static_dir: "static".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            pinned_donor: "SDIT Albashiirah".to_string(),
            admin_session_token: None,
            admin_user_id: None,
        }
    }

    async fn test_app() -> (Router, AppState, Arc<InMemoryAuthGateway>) {
        let db = DbConnection::init_test().await.unwrap();
        let gateway = Arc::new(InMemoryAuthGateway::new());
        let auth: Arc<dyn AuthGateway> = gateway.clone();
        let state = build_state(db, auth, "SDIT Albashiirah".to_string());
        let app = create_router(state.clone(), &test_config());
        (app, state, gateway)
    }

    /// Create a user and register a live session for them.
    async fn seed_user(
        state: &AppState,
        gateway: &InMemoryAuthGateway,
        email: &str,
        role: Role,
        token: &str,
    ) -> String {
        let profile = state
            .users
            .create(shared::CreateUserRequest {
                email: email.to_string(),
                password: "rahasia123".to_string(),
                full_name: "Petugas".to_string(),
                role: Some(role),
            })
            .await
            .unwrap();
        gateway.insert_session(token, &profile.id);
        profile.id
    }

    #[tokio::test]
    async fn admin_api_without_session_is_401() {
        let (app, _, _) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_pages_redirect_to_login_without_session() {
        let (app, _, _) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
    }

    #[tokio::test]
    async fn login_page_redirects_to_dashboard_with_session() {
        let (app, state, gateway) = test_app().await;
        seed_user(&state, &gateway, "admin@example.org", Role::Admin, "tok").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/login")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/dashboard"
        );
    }

    #[tokio::test]
    async fn non_admin_paths_pass_the_gate_untouched() {
        let (app, _, _) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/public/summary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn staff_cannot_manage_users() {
        let (app, state, gateway) = test_app().await;
        seed_user(&state, &gateway, "staff@example.org", Role::Staff, "staff-tok").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/users")
                    .header(header::AUTHORIZATION, "Bearer staff-tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_cannot_delete_their_own_account() {
        let (app, state, gateway) = test_app().await;
        let admin_id =
            seed_user(&state, &gateway, "admin@example.org", Role::Admin, "admin-tok").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/admin/users/{}", admin_id))
                    .header(header::AUTHORIZATION, "Bearer admin-tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The account is still there.
        assert_eq!(state.users.list().await.unwrap().total_items, 1);
    }

    #[tokio::test]
    async fn mutation_with_identical_accounts_is_400() {
        let (app, state, gateway) = test_app().await;
        seed_user(&state, &gateway, "admin@example.org", Role::Admin, "tok").await;
        let event = state
            .events
            .create(shared::CreateEventRequest {
                name: "Peduli Banjir".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                target_amount: None,
            })
            .await
            .unwrap();

        let body = json!({
            "event_id": event.id,
            "mutation_date": "2024-01-01T00:00:00Z",
            "from_account": "tunai",
            "to_account": "tunai",
            "amount": 500000,
            "notes": null,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/mutations")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let listed = state.mutations.list(None, None, None).await.unwrap();
        assert_eq!(listed.total_items, 0);
    }

    #[tokio::test]
    async fn public_feed_is_empty_without_an_active_event() {
        let (app, _, _) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/public/feed?page=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let feed: shared::PublicFeedResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(feed.entries.is_empty());
    }

    #[tokio::test]
    async fn donation_export_downloads_csv() {
        let (app, state, gateway) = test_app().await;
        seed_user(&state, &gateway, "admin@example.org", Role::Admin, "tok").await;
        let event = state
            .events
            .create(shared::CreateEventRequest {
                name: "Peduli Banjir".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                target_amount: None,
            })
            .await
            .unwrap();
        state
            .donations
            .create(shared::CreateDonationRequest {
                event_id: event.id,
                donor_id: None,
                donor_name: Some("Budi".to_string()),
                amount: 50_000,
                method: shared::PaymentMethod::Cash,
                transaction_date: None,
            })
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/donations/export")
                    .header(header::AUTHORIZATION, "Bearer tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Laporan_Donasi_"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(csv.starts_with("Tanggal,Donatur,Event,Tipe,Jumlah,Catatan"));
        assert!(csv.contains("Budi"));
    }
}
