//! One-shot notices carried across a redirect in the session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::AppError;
use crate::constants::session::FLASHES_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Info,
    Warning,
    Danger,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

/// Queues a notice for the next rendered page.
pub async fn push(
    session: &Session,
    category: Category,
    message: impl Into<String>,
) -> Result<(), AppError> {
    let mut pending: Vec<Flash> = session.get(FLASHES_KEY).await?.unwrap_or_default();
    pending.push(Flash {
        category,
        message: message.into(),
    });
    session.insert(FLASHES_KEY, pending).await?;
    Ok(())
}

/// Drains queued notices. A broken session only costs the notices.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(FLASHES_KEY).await {
        Ok(flashes) => flashes.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read flashes from session: {e}");
            Vec::new()
        }
    }
}
