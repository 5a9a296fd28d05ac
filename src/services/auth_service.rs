//! Registration and credential checks.
//!
//! Session bookkeeping (who is logged in on which cookie) lives in the HTTP
//! layer; this service only answers "is this username/password pair valid".

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::user::User;
use crate::services::password;
use crate::services::user_store::{UserStore, UserStoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error(transparent)]
    Store(UserStoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserStoreError> for AuthError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateUsername(name) => Self::UsernameTaken(name),
            other => Self::Store(other),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, security: SecurityConfig) -> Self {
        Self { users, security }
    }

    /// Hashes the password and creates the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] if the name is already registered.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let password_hash = password::hash_password_blocking(password, &self.security).await?;
        let user = self.users.create(username, &password_hash).await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Verifies credentials and returns the matching user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self.users.find_credentials(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if password::verify_password_blocking(password, &password_hash).await? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
