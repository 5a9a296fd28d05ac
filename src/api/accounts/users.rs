use axum::{
    extract::{Path, State},
    response::{Html, Response},
};
use std::sync::Arc;

use super::{AccountsState, AuthSession, CurrentUser};
use crate::api::flash::Category;
use crate::api::{AppError, found, views};

/// GET /
pub async fn home(
    State(state): State<Arc<AccountsState>>,
    auth: AuthSession,
) -> Result<Html<String>, AppError> {
    let users = state.users.list_all().await?;
    let current = auth.current_user(state.users.as_ref()).await?;
    let flashes = auth.take_flashes().await;

    Ok(Html(views::accounts::home(current.as_ref(), &flashes, &users)))
}

/// GET /accounts
pub async fn accounts(
    State(state): State<Arc<AccountsState>>,
    current: CurrentUser,
) -> Result<Html<String>, AppError> {
    let users = state.users.list_all().await?;
    let flashes = current.session.take_flashes().await;

    Ok(Html(views::accounts::accounts(
        &current.user,
        &flashes,
        &users,
    )))
}

/// POST /login_as/{user_id}
/// Sends the browser to the login form with that user's name filled in.
pub async fn login_as(
    State(state): State<Arc<AccountsState>>,
    current: CurrentUser,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    match state.users.find_by_id(user_id).await? {
        Some(user) => Ok(found(&format!("/login?user_id={}", user.id))),
        None => {
            current
                .session
                .flash(Category::Danger, "User not found.")
                .await?;
            Ok(found("/accounts"))
        }
    }
}

/// POST /delete_user/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AccountsState>>,
    current: CurrentUser,
    Path(user_id): Path<i32>,
) -> Result<Response, AppError> {
    match state.users.find_by_id(user_id).await? {
        Some(user) => {
            state.users.delete(&user).await?;
            tracing::info!(
                deleted_user_id = user.id,
                by_user_id = current.user.id,
                "User deleted from accounts page"
            );
            current
                .session
                .flash(
                    Category::Warning,
                    format!("User {} has been deleted.", user.username),
                )
                .await?;
        }
        None => {
            current
                .session
                .flash(Category::Danger, "User not found.")
                .await?;
        }
    }

    Ok(found("/accounts"))
}
