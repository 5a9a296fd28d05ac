pub mod auth_service;
pub mod avatar;
pub mod password;
pub mod profile_service;
pub mod task_store;
pub mod user_store;

pub use auth_service::{AuthError, AuthService};
pub use avatar::{AvatarError, AvatarStorage, AvatarUpload};
pub use profile_service::{ProfileEditor, ProfileError};
pub use task_store::TaskStore;
pub use user_store::{UserStore, UserStoreError};
