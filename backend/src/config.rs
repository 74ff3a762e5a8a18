//! Environment-driven runtime configuration.
//!
//! Loaded once at startup and handed to `initialize_backend`; nothing else
//! reads the environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server binds on.
    pub port: u16,
    /// sqlx connection string for the SQLite store.
    pub database_url: String,
    /// Directory of static assets served behind the access gate.
    pub static_dir: String,
    /// Origin allowed by the CORS layer.
    pub allowed_origin: String,
    /// Donor-name keyword marking the affiliated organisation whose
    /// donations are pinned (and whose name is shown) on the public feed.
    pub pinned_donor: String,
    /// Optional pre-provisioned admin session, for running without a
    /// fronting identity service. Both must be set to take effect.
    pub admin_session_token: Option<String>,
    pub admin_user_id: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: parse_var("APP_PORT", "3000"),
            database_url: string_var("DATABASE_URL", "sqlite:donation-tracker.db"),
            static_dir: string_var("STATIC_DIR", "static"),
            allowed_origin: string_var("ALLOWED_ORIGIN", "http://localhost:8080"),
            pinned_donor: string_var("PINNED_DONOR", "SDIT Albashiirah"),
            admin_session_token: env::var("ADMIN_SESSION_TOKEN").ok(),
            admin_user_id: env::var("ADMIN_USER_ID").ok(),
        }
    }
}

fn string_var(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = string_var(key, default);
    match raw.parse() {
        Ok(value) => value,
        Err(e) => panic!("invalid {} value {:?}: {}", key, raw, e),
    }
}
