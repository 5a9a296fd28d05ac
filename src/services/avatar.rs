use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::constants::{ALLOWED_AVATAR_EXTENSIONS, AVATAR_EXTENSION, DEFAULT_AVATAR};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvatarError {
    #[error("Only jpg and png images are allowed")]
    UnsupportedExtension,

    #[error("File content is not a jpg or png image")]
    UnrecognizedContent,
}

/// A file received from the profile form.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Accepts `jpg`/`png` names whose bytes actually start with a JPEG or PNG signature.
    pub fn validate(&self) -> Result<(), AvatarError> {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(AvatarError::UnsupportedExtension)?;

        if !ALLOWED_AVATAR_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AvatarError::UnsupportedExtension);
        }

        if self.bytes.starts_with(PNG_SIGNATURE) || self.bytes.starts_with(JPEG_SIGNATURE) {
            Ok(())
        } else {
            Err(AvatarError::UnrecognizedContent)
        }
    }
}

/// Avatar files on disk, one per user, named `<user_id>.png`.
#[derive(Debug, Clone)]
pub struct AvatarStorage {
    upload_dir: PathBuf,
}

impl AvatarStorage {
    #[must_use]
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.upload_dir).await.with_context(|| {
            format!(
                "Failed to create upload directory {}",
                self.upload_dir.display()
            )
        })
    }

    #[must_use]
    pub fn file_name_for(user_id: i32) -> String {
        format!("{user_id}.{AVATAR_EXTENSION}")
    }

    /// Resolves a stored file name inside the upload dir. Anything that is not
    /// a bare file name resolves to `None`.
    #[must_use]
    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        let name = Path::new(file_name).file_name()?;
        if name != file_name {
            return None;
        }
        Some(self.upload_dir.join(name))
    }

    /// Writes the avatar for `user_id`, replacing any previous one, and returns the stored name.
    pub async fn save(&self, user_id: i32, bytes: &[u8]) -> Result<String> {
        self.ensure_dir().await?;

        let file_name = Self::file_name_for(user_id);
        let file_path = self.upload_dir.join(&file_name);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write avatar to {}", file_path.display()))?;

        info!(user_id, path = %file_path.display(), "Saved avatar");
        Ok(file_name)
    }

    /// Removes an avatar file. The default avatar and files already gone are
    /// left alone; returns whether a file was deleted.
    pub async fn remove(&self, file_name: &str) -> std::io::Result<bool> {
        if file_name.is_empty() || file_name == DEFAULT_AVATAR {
            return Ok(false);
        }

        let Some(path) = self.path_for(file_name) else {
            warn!(file_name, "Refusing to remove avatar outside the upload dir");
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Removed avatar");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> AvatarUpload {
        AvatarUpload {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn temp_storage() -> AvatarStorage {
        AvatarStorage::new(
            std::env::temp_dir().join(format!("tandem-avatars-{}", uuid::Uuid::new_v4())),
        )
    }

    #[test]
    fn test_validate_upload() {
        assert!(upload("me.png", b"\x89PNG\r\n\x1a\nrest").validate().is_ok());
        assert!(upload("me.JPG", &[0xFF, 0xD8, 0xFF, 0xE0]).validate().is_ok());
        assert_eq!(
            upload("me.gif", b"GIF89a").validate(),
            Err(AvatarError::UnsupportedExtension)
        );
        assert_eq!(
            upload("noext", b"\x89PNG\r\n\x1a\n").validate(),
            Err(AvatarError::UnsupportedExtension)
        );
        assert_eq!(
            upload("fake.png", b"<script>").validate(),
            Err(AvatarError::UnrecognizedContent)
        );
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let storage = AvatarStorage::new("uploads");
        assert_eq!(
            storage.path_for("7.png"),
            Some(PathBuf::from("uploads").join("7.png"))
        );
        assert_eq!(storage.path_for("../secret"), None);
        assert_eq!(storage.path_for("a/b.png"), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_remove() {
        let storage = temp_storage();

        let name = storage.save(7, b"first").await.unwrap();
        assert_eq!(name, "7.png");
        storage.save(7, b"second").await.unwrap();

        let path = storage.path_for(&name).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");

        assert!(storage.remove(&name).await.unwrap());
        assert!(!path.exists());
        assert!(!storage.remove(&name).await.unwrap());

        let _ = tokio::fs::remove_dir_all(storage.upload_dir()).await;
    }

    #[tokio::test]
    async fn test_remove_never_touches_default_avatar() {
        let storage = temp_storage();
        storage.ensure_dir().await.unwrap();
        let default_path = storage.upload_dir().join(DEFAULT_AVATAR);
        tokio::fs::write(&default_path, b"placeholder").await.unwrap();

        assert!(!storage.remove(DEFAULT_AVATAR).await.unwrap());
        assert!(default_path.exists());

        let _ = tokio::fs::remove_dir_all(storage.upload_dir()).await;
    }
}
