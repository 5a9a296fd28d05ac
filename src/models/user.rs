use crate::constants::DEFAULT_AVATAR;

/// An account as the rest of the app sees it. The password hash stays in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub profile_pic: String,
}

impl User {
    /// Whether the avatar is the shared placeholder rather than an uploaded file.
    #[must_use]
    pub fn has_default_avatar(&self) -> bool {
        self.profile_pic.is_empty() || self.profile_pic == DEFAULT_AVATAR
    }
}
