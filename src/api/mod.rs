use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
};
use tower_http::trace::TraceLayer;

pub mod accounts;
mod error;
pub mod flash;
mod observability;
pub mod tasks;
pub mod validation;
mod views;

pub use error::{AppError, not_found};

/// A `302 Found` redirect, the status browsers and form posts expect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// The login page, remembering where an anonymous visitor was headed.
#[must_use]
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("/login?next={}", urlencoding::encode(next)),
        None => "/login".to_string(),
    }
}

/// Request logging, metrics and security headers shared by both services.
pub(crate) fn with_common_layers(router: Router) -> Router {
    router
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
