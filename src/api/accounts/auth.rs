use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{AccountsState, AuthSession, CurrentUser};
use crate::api::flash::Category;
use crate::api::validation::{self, FormErrors};
use crate::api::{AppError, found, views};
use crate::services::AuthError;

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    /// Kept as text so a malformed id just means "no prefill".
    pub user_id: Option<String>,
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// GET /register
pub async fn register_page(auth: AuthSession) -> Html<String> {
    let flashes = auth.take_flashes().await;
    Html(views::accounts::register(&flashes, "", &FormErrors::default()))
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AccountsState>>,
    auth: AuthSession,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let mut errors = validation::validate_registration(&form.username, &form.password);

    if errors.is_empty() {
        match state.auth.register(&form.username, &form.password).await {
            Ok(_) => {
                auth.flash(Category::Success, "Account created successfully!")
                    .await?;
                return Ok(found("/login"));
            }
            Err(AuthError::UsernameTaken(_)) => errors.add("username", "Username already taken."),
            Err(e) => return Err(e.into()),
        }
    }

    let flashes = auth.take_flashes().await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::accounts::register(&flashes, &form.username, &errors)),
    )
        .into_response())
}

/// GET /login
pub async fn login_page(
    State(state): State<Arc<AccountsState>>,
    auth: AuthSession,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, AppError> {
    let mut username = String::new();

    if let Some(user_id) = query.user_id.as_deref().and_then(|id| id.parse::<i32>().ok()) {
        if let Some(user) = state.users.find_by_id(user_id).await? {
            username = user.username;
        }
    }

    let current = auth.current_user(state.users.as_ref()).await?;
    let flashes = auth.take_flashes().await;

    Ok(Html(views::accounts::login(
        current.as_ref(),
        &flashes,
        &username,
        validation::safe_next(query.next.as_deref()),
        &FormErrors::default(),
    )))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AccountsState>>,
    auth: AuthSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = validation::safe_next(form.next.as_deref());
    let errors = validation::validate_login(&form.username, &form.password);

    let status = if errors.is_empty() {
        match state.auth.login(&form.username, &form.password).await {
            Ok(user) => {
                auth.sign_in(&user).await?;
                auth.flash(Category::Success, "Login successful!").await?;
                return Ok(found(next.unwrap_or("/profile")));
            }
            Err(AuthError::InvalidCredentials) => {
                tracing::info!(username = %form.username, "Failed login attempt");
                auth.flash(Category::Danger, "Login failed. Check username and password.")
                    .await?;
                StatusCode::UNAUTHORIZED
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    let current = auth.current_user(state.users.as_ref()).await?;
    let flashes = auth.take_flashes().await;
    Ok((
        status,
        Html(views::accounts::login(
            current.as_ref(),
            &flashes,
            &form.username,
            next,
            &errors,
        )),
    )
        .into_response())
}

/// GET /logout
pub async fn logout(current: CurrentUser) -> Result<Response, AppError> {
    current.session.sign_out().await?;
    current
        .session
        .flash(Category::Info, "You have been logged out.")
        .await?;
    Ok(found("/login"))
}
