//! Cookie-session identity for the account service.
//!
//! The session store keeps only the user id; everything else is loaded per
//! request so a deleted or renamed user is seen immediately.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::AccountsState;
use crate::api::flash::{self, Category, Flash};
use crate::api::{AppError, found, login_url};
use crate::constants::session::USER_ID_KEY;
use crate::models::user::User;
use crate::services::user_store::UserStore;

/// The request's session, with helpers for the logged-in identity and flashes.
pub struct AuthSession {
    session: Session,
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::internal(msg))?;
        Ok(Self { session })
    }
}

impl AuthSession {
    /// Binds the session to `user` under a fresh session id.
    pub async fn sign_in(&self, user: &User) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.session.insert(USER_ID_KEY, user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(())
    }

    /// Forgets the identity. Other session data, such as pending flashes, is kept.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        if let Some(user_id) = self.session.remove::<i32>(USER_ID_KEY).await? {
            tracing::info!(user_id, "User logged out");
        }
        self.session.cycle_id().await?;
        Ok(())
    }

    pub async fn user_id(&self) -> Result<Option<i32>, AppError> {
        Ok(self.session.get::<i32>(USER_ID_KEY).await?)
    }

    /// Resolves the stored id to a user. A dangling id is dropped from the session.
    pub async fn current_user(&self, users: &dyn UserStore) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.user_id().await? else {
            return Ok(None);
        };

        match users.find_by_id(user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                self.session.remove::<i32>(USER_ID_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn flash(&self, category: Category, message: impl Into<String>) -> Result<(), AppError> {
        flash::push(&self.session, category, message).await
    }

    pub async fn take_flashes(&self) -> Vec<Flash> {
        flash::take(&self.session).await
    }
}

/// Extractor for routes that need a logged-in user. Anonymous requests are
/// redirected to the login page with the original path as `next`.
pub struct CurrentUser {
    pub user: User,
    pub session: AuthSession,
}

impl FromRequestParts<Arc<AccountsState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AccountsState>,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.current_user(state.users.as_ref()).await {
            Ok(Some(user)) => {
                tracing::Span::current().record("user_id", user.id);
                Ok(Self { user, session })
            }
            Ok(None) => {
                session
                    .flash(Category::Info, "Please log in to access this page.")
                    .await
                    .map_err(IntoResponse::into_response)?;

                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
                Err(found(&login_url(Some(next))))
            }
            Err(e) => Err(e.into_response()),
        }
    }
}
