/// Shared placeholder avatar. Never deleted from disk.
pub const DEFAULT_AVATAR: &str = "default.png";

/// Extension every uploaded avatar is stored under, whatever was uploaded.
pub const AVATAR_EXTENSION: &str = "png";

pub const ALLOWED_AVATAR_EXTENSIONS: &[&str] = &["jpg", "png"];

pub mod forms {

    pub const USERNAME_MIN_CHARS: usize = 4;

    pub const USERNAME_MAX_CHARS: usize = 150;

    pub const PASSWORD_MIN_CHARS: usize = 6;
}

pub mod session {

    pub const USER_ID_KEY: &str = "user_id";

    pub const FLASHES_KEY: &str = "_flashes";
}

pub mod routes {

    pub const UPLOADS_MOUNT: &str = "/static/uploads";
}
