//! User management. Two layers of protection apply to these operations: the
//! route gate already checked for a session, and every call here re-checks
//! that the caller's profile carries the admin role.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::{CreateUserRequest, Profile, Role, UpdateUserRequest, UserListResponse};

use crate::auth::{AuthGateway, Session};
use crate::error::DomainError;
use crate::storage::ProfileRepository;

#[derive(Clone)]
pub struct UserService {
    profiles: ProfileRepository,
    auth: Arc<dyn AuthGateway>,
}

impl UserService {
    pub fn new(profiles: ProfileRepository, auth: Arc<dyn AuthGateway>) -> Self {
        Self { profiles, auth }
    }

    /// The caller's own profile.
    pub async fn profile(&self, session: &Session) -> Result<Profile> {
        self.profiles
            .get(&session.user_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("profile")))
    }

    /// Role sufficiency check for user-management operations.
    pub async fn ensure_admin(&self, session: &Session) -> Result<Profile> {
        let profile = self.profile(session).await?;
        if profile.role != Role::Admin {
            return Err(anyhow!(DomainError::Forbidden(
                "admin access required".to_string()
            )));
        }
        Ok(profile)
    }

    pub async fn list(&self) -> Result<UserListResponse> {
        let users = self.profiles.list().await?;
        let total_items = users.len() as u32;
        Ok(UserListResponse { users, total_items })
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<Profile> {
        if request.email.trim().is_empty()
            || request.password.is_empty()
            || request.full_name.trim().is_empty()
        {
            return Err(anyhow!(DomainError::Validation(
                "missing required fields".to_string()
            )));
        }
        let email = request.email.trim().to_string();
        if self.profiles.find_by_email(&email).await?.is_some() {
            return Err(anyhow!(DomainError::Validation(
                "email already registered".to_string()
            )));
        }

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            email,
            full_name: request.full_name.trim().to_string(),
            role: request.role.unwrap_or(Role::Staff),
            created_at: now,
            updated_at: now,
        };
        self.profiles.store(&profile).await?;
        self.auth
            .create_credentials(&profile.id, &profile.email, &request.password)?;
        info!("created user {} ({})", profile.id, profile.email);
        Ok(profile)
    }

    pub async fn update(&self, user_id: &str, request: UpdateUserRequest) -> Result<Profile> {
        let mut profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or_else(|| anyhow!(DomainError::NotFound("user")))?;

        if let Some(email) = &request.email {
            let email = email.trim();
            if email.is_empty() {
                return Err(anyhow!(DomainError::Validation(
                    "email must not be empty".to_string()
                )));
            }
            if let Some(existing) = self.profiles.find_by_email(email).await? {
                if existing.id != profile.id {
                    return Err(anyhow!(DomainError::Validation(
                        "email already registered".to_string()
                    )));
                }
            }
            profile.email = email.to_string();
        }
        if let Some(full_name) = &request.full_name {
            profile.full_name = full_name.trim().to_string();
        }
        if let Some(role) = request.role {
            profile.role = role;
        }
        profile.updated_at = Utc::now();

        self.profiles.update(&profile).await?;
        self.auth.update_credentials(
            &profile.id,
            request.email.as_deref(),
            request.password.as_deref(),
        )?;
        Ok(profile)
    }

    /// Delete a user. An admin can never delete their own account.
    pub async fn delete(&self, user_id: &str, caller: &Session) -> Result<()> {
        if user_id == caller.user_id {
            return Err(anyhow!(DomainError::Validation(
                "cannot delete your own account".to_string()
            )));
        }
        if !self.profiles.delete(user_id).await? {
            return Err(anyhow!(DomainError::NotFound("user")));
        }
        self.auth.delete_credentials(user_id)?;
        info!("deleted user {}", user_id);
        Ok(())
    }
}
