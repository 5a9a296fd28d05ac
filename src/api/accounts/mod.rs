//! The account manager: registration, login, profile editing, avatar upload
//! and account deletion.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{AccountsConfig, Config};
use crate::constants::routes::UPLOADS_MOUNT;
use crate::db::{self, UserRepository};
use crate::services::{AuthService, AvatarStorage, ProfileEditor, UserStore};

mod auth;
mod profile;
pub mod session;
mod users;

pub use session::{AuthSession, CurrentUser};

pub struct AccountsState {
    pub config: AccountsConfig,

    pub users: Arc<dyn UserStore>,

    pub auth: AuthService,

    pub profiles: ProfileEditor,

    pub avatars: AvatarStorage,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_state_from_config(
    config: &Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AccountsState>> {
    let accounts = config.accounts.clone();

    let conn = db::connect_accounts(
        &accounts.database_path,
        accounts.max_db_connections,
        accounts.min_db_connections,
    )
    .await?;

    let avatars = AvatarStorage::new(&accounts.upload_dir);
    avatars.ensure_dir().await?;

    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(conn, avatars.clone()));

    Ok(Arc::new(AccountsState {
        auth: AuthService::new(users.clone(), config.security.clone()),
        profiles: ProfileEditor::new(users.clone(), avatars.clone()),
        users,
        avatars,
        config: accounts,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AccountsState>) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_ttl_minutes,
        )));

    let app = Router::new()
        .route("/", get(users::home))
        .route("/accounts", get(users::accounts))
        .route("/login_as/{user_id}", post(users::login_as))
        .route("/delete_user/{user_id}", post(users::delete_user))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/profile",
            get(profile::show_profile)
                .post(profile::update_profile)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/delete_account", post(profile::delete_account))
        .nest_service(UPLOADS_MOUNT, ServeDir::new(state.avatars.upload_dir()))
        .merge(crate::api::observability::metrics_routes(
            state.prometheus_handle.clone(),
        ))
        .fallback(crate::api::not_found)
        .layer(session_layer)
        .with_state(state);

    crate::api::with_common_layers(app)
}
