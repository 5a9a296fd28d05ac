use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use super::{AccountsState, CurrentUser};
use crate::api::flash::Category;
use crate::api::validation::{self, FormErrors};
use crate::api::{AppError, found, views};
use crate::services::{AvatarUpload, ProfileError};

/// Fields of the multipart profile form.
#[derive(Debug, Default)]
struct ProfileForm {
    username: String,
    profile_pic: Option<AvatarUpload>,
}

impl ProfileForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("username") => form.username = field.text().await?,
                Some("profile_pic") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked.
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.profile_pic = Some(AvatarUpload {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// GET /profile
pub async fn show_profile(current: CurrentUser) -> Html<String> {
    let flashes = current.session.take_flashes().await;
    Html(views::accounts::profile(
        &current.user,
        &flashes,
        &current.user.username,
        &FormErrors::default(),
    ))
}

/// POST /profile
pub async fn update_profile(
    State(state): State<Arc<AccountsState>>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = ProfileForm::from_multipart(multipart).await?;
    let mut errors = validation::validate_profile(&form.username);

    if errors.is_empty() {
        match state
            .profiles
            .update_profile(&current.user, &form.username, form.profile_pic)
            .await
        {
            Ok(_) => {
                current
                    .session
                    .flash(Category::Success, "Profile updated successfully!")
                    .await?;
                return Ok(found("/profile"));
            }
            Err(ProfileError::UsernameTaken(_)) => {
                errors.add("username", "Username already taken.");
            }
            Err(ProfileError::InvalidAvatar(e)) => errors.add("profile_pic", e.to_string()),
            Err(e) => return Err(e.into()),
        }
    }

    let flashes = current.session.take_flashes().await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::accounts::profile(
            &current.user,
            &flashes,
            &form.username,
            &errors,
        )),
    )
        .into_response())
}

/// POST /delete_account
pub async fn delete_account(
    State(state): State<Arc<AccountsState>>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    state.users.delete(&current.user).await?;
    current.session.sign_out().await?;
    current
        .session
        .flash(Category::Warning, "Your account has been deleted.")
        .await?;

    tracing::info!(user_id = current.user.id, "Account self-deleted");
    Ok(found("/"))
}
