use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::user::User;
use crate::services::avatar::{AvatarError, AvatarStorage, AvatarUpload};
use crate::services::user_store::{UserStore, UserStoreError};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error(transparent)]
    InvalidAvatar(#[from] AvatarError),

    #[error(transparent)]
    Store(UserStoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserStoreError> for ProfileError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateUsername(name) => Self::UsernameTaken(name),
            other => Self::Store(other),
        }
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Applies edits from the profile form to a user.
pub struct ProfileEditor {
    users: Arc<dyn UserStore>,
    avatars: AvatarStorage,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, avatars: AvatarStorage) -> Self {
        Self { users, avatars }
    }

    /// Renames the user and, when an upload is given, replaces the avatar.
    ///
    /// The new name must not belong to another account. The upload is checked
    /// before anything is written.
    pub async fn update_profile(
        &self,
        user: &User,
        new_username: &str,
        avatar: Option<AvatarUpload>,
    ) -> Result<User, ProfileError> {
        if let Some(upload) = &avatar {
            upload.validate()?;
        }

        if new_username != user.username {
            if let Some(other) = self.users.find_by_username(new_username).await? {
                if other.id != user.id {
                    return Err(ProfileError::UsernameTaken(new_username.to_string()));
                }
            }
        }

        let mut updated = user.clone();
        updated.username = new_username.to_string();

        if let Some(upload) = avatar {
            updated.profile_pic = self.avatars.save(user.id, &upload.bytes).await?;
        }
        let replaced_file = updated.profile_pic != user.profile_pic;

        let saved = match self.users.update(&updated).await {
            Ok(saved) => saved,
            Err(e) => {
                // The row still names the old avatar, so the new file is unreferenced.
                if replaced_file {
                    if let Err(io) = self.avatars.remove(&updated.profile_pic).await {
                        warn!(user_id = user.id, "Failed to discard unused avatar: {io}");
                    }
                }
                return Err(e.into());
            }
        };

        if replaced_file && !user.has_default_avatar() {
            self.avatars
                .remove(&user.profile_pic)
                .await
                .map_err(UserStoreError::from)?;
        }

        info!(user_id = saved.id, username = %saved.username, "Profile updated");

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, UserRepository};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nrest";

    async fn setup() -> (Arc<dyn UserStore>, ProfileEditor, AvatarStorage) {
        let conn = db::connect_accounts("sqlite::memory:", 1, 1).await.unwrap();
        let avatars = AvatarStorage::new(
            std::env::temp_dir().join(format!("tandem-profile-{}", uuid::Uuid::new_v4())),
        );
        let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(conn, avatars.clone()));
        let editor = ProfileEditor::new(users.clone(), avatars.clone());
        (users, editor, avatars)
    }

    fn upload(name: &str, bytes: &[u8]) -> Option<AvatarUpload> {
        Some(AvatarUpload {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_rename_and_upload() {
        let (users, editor, avatars) = setup().await;
        let alice = users.create("alice", "h").await.unwrap();

        let saved = editor
            .update_profile(&alice, "alicia", upload("me.png", PNG))
            .await
            .unwrap();

        assert_eq!(saved.username, "alicia");
        assert_eq!(saved.profile_pic, AvatarStorage::file_name_for(alice.id));
        assert!(avatars.path_for(&saved.profile_pic).unwrap().exists());
        assert_eq!(users.find_by_id(alice.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_taken_name_writes_nothing() {
        let (users, editor, avatars) = setup().await;
        let alice = users.create("alice", "h").await.unwrap();
        users.create("bobby", "h").await.unwrap();

        let err = editor
            .update_profile(&alice, "bobby", upload("me.png", PNG))
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::UsernameTaken(_)));

        let file = AvatarStorage::file_name_for(alice.id);
        assert!(!avatars.path_for(&file).unwrap().exists());
    }

    #[tokio::test]
    async fn test_failed_update_discards_new_avatar() {
        let (users, editor, avatars) = setup().await;
        let alice = users.create("alice", "h").await.unwrap();

        // Deleted by someone else after this request loaded the user.
        users.delete(&alice).await.unwrap();

        let err = editor
            .update_profile(&alice, "alice", upload("me.png", PNG))
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Store(UserStoreError::NotFound(_))));

        let file = AvatarStorage::file_name_for(alice.id);
        assert!(!avatars.path_for(&file).unwrap().exists());
    }

    #[tokio::test]
    async fn test_old_custom_avatar_removed_after_update() {
        let (users, editor, avatars) = setup().await;
        let mut alice = users.create("alice", "h").await.unwrap();

        avatars.ensure_dir().await.unwrap();
        let legacy = avatars.path_for("legacy.jpg").unwrap();
        tokio::fs::write(&legacy, PNG).await.unwrap();
        alice.profile_pic = "legacy.jpg".to_string();
        let alice = users.update(&alice).await.unwrap();

        editor
            .update_profile(&alice, "alice", upload("new.png", PNG))
            .await
            .unwrap();
        assert!(!legacy.exists());
    }
}
