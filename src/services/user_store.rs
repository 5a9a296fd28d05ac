//! Persistence boundary for accounts.

use thiserror::Error;

use crate::models::user::User;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Avatar file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sea_orm::DbErr> for UserStoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Storage for [`User`] records. Each call is a single statement; nothing spans a transaction.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user with the default avatar.
    ///
    /// # Errors
    ///
    /// Returns [`UserStoreError::DuplicateUsername`] if the name is already in use.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, UserStoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    /// Looks up a user together with the stored password hash, for credential checks.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, UserStoreError>;

    /// All users in id order.
    async fn list_all(&self) -> Result<Vec<User>, UserStoreError>;

    /// Persists `username` and `profile_pic` of an existing user.
    async fn update(&self, user: &User) -> Result<User, UserStoreError>;

    /// Deletes the row, then the user's avatar file unless it is the default one.
    async fn delete(&self, user: &User) -> Result<(), UserStoreError>;
}
