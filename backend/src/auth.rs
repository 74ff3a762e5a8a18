//! Session handling and the admin access gate.
//!
//! Session issuance (login, token refresh) belongs to a fronting identity
//! service; this module only consumes its contract. The gate holds no state
//! of its own beyond reading the session token off the request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::error::ApiError;

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// An authenticated caller. Role checks happen against the profile row, not
/// the session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

/// Contract of the external auth/session provider.
///
/// Resolving tokens backs the access gate; the credential hooks are invoked
/// by user management so account changes reach the identity service.
pub trait AuthGateway: Send + Sync {
    fn resolve_session(&self, token: &str) -> Option<Session>;

    fn create_credentials(&self, user_id: &str, email: &str, password: &str) -> Result<()>;

    fn update_credentials(
        &self,
        user_id: &str,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<()>;

    fn delete_credentials(&self, user_id: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
struct StoredCredentials {
    email: String,
    password: String,
}

/// In-process gateway used by tests and by deployments that pre-provision an
/// admin session instead of running an identity service.
#[derive(Default)]
pub struct InMemoryAuthGateway {
    sessions: Mutex<HashMap<String, Session>>,
    credentials: Mutex<HashMap<String, StoredCredentials>>,
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live session under the given token.
    pub fn insert_session(&self, token: &str, user_id: &str) {
        self.sessions.lock().unwrap().insert(
            token.to_string(),
            Session {
                user_id: user_id.to_string(),
            },
        );
    }
}

impl AuthGateway for InMemoryAuthGateway {
    fn resolve_session(&self, token: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(token).cloned()
    }

    fn create_credentials(&self, user_id: &str, email: &str, password: &str) -> Result<()> {
        self.credentials.lock().unwrap().insert(
            user_id.to_string(),
            StoredCredentials {
                email: email.to_string(),
                password: password.to_string(),
            },
        );
        Ok(())
    }

    fn update_credentials(
        &self,
        user_id: &str,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<()> {
        let mut credentials = self.credentials.lock().unwrap();
        let entry = credentials.entry(user_id.to_string()).or_default();
        if let Some(email) = email {
            entry.email = email.to_string();
        }
        if let Some(password) = password {
            entry.password = password.to_string();
        }
        Ok(())
    }

    fn delete_credentials(&self, user_id: &str) -> Result<()> {
        self.credentials.lock().unwrap().remove(user_id);
        // Revoke any session belonging to the deleted account.
        self.sessions
            .lock()
            .unwrap()
            .retain(|_, session| session.user_id != user_id);
        Ok(())
    }
}

/// Pull the session token off a request: `Authorization: Bearer <token>` or
/// a `session_token` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session_token").then(|| value.trim().to_string())
    })
}

/// Gate for admin-prefixed page paths.
///
/// Unauthenticated requests to any admin path except the login path are sent
/// to the login path; authenticated requests to the login path are sent to
/// the dashboard. Everything else passes through unchanged.
pub async fn page_gate(
    State(auth): State<Arc<dyn AuthGateway>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if !path.starts_with("/admin") {
        return next.run(req).await;
    }

    let session = session_token(req.headers()).and_then(|token| auth.resolve_session(&token));

    if path == LOGIN_PATH && session.is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    if path != LOGIN_PATH && session.is_none() {
        info!("redirecting unauthenticated request for {} to login", path);
        return Redirect::to(LOGIN_PATH).into_response();
    }

    next.run(req).await
}

/// Gate for `/api/admin` routes: 401 instead of a redirect, and the resolved
/// [`Session`] is attached to the request for handlers to read.
pub async fn require_session(
    State(auth): State<Arc<dyn AuthGateway>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers()).ok_or(ApiError::Unauthorized)?;
    let session = auth
        .resolve_session(&token)
        .ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
