use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, Unchanged,
};
use tracing::{info, warn};

use crate::constants::DEFAULT_AVATAR;
use crate::entities::users;
use crate::models::user::User;
use crate::services::avatar::AvatarStorage;
use crate::services::user_store::{UserStore, UserStoreError};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            profile_pic: model.profile_pic,
        }
    }
}

/// `users` table access through sea-orm. Deleting a user also removes the avatar file.
pub struct UserRepository {
    conn: DatabaseConnection,
    avatars: AvatarStorage,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, avatars: AvatarStorage) -> Self {
        Self { conn, avatars }
    }

    fn map_write_err(err: DbErr, username: &str) -> UserStoreError {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            UserStoreError::DuplicateUsername(username.to_string())
        } else {
            UserStoreError::from(err)
        }
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, UserStoreError> {
        let active = users::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            profile_pic: Set(DEFAULT_AVATAR.to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .map_err(|e| Self::map_write_err(e, username))?;

        Ok(User::from(model))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        let user = users::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(user.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, UserStoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserStoreError> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(&self, user: &User) -> Result<User, UserStoreError> {
        let active = users::ActiveModel {
            id: Unchanged(user.id),
            username: Set(user.username.clone()),
            profile_pic: Set(user.profile_pic.clone()),
            ..Default::default()
        };

        let model = active.update(&self.conn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserStoreError::NotFound(user.id),
            other => Self::map_write_err(other, &user.username),
        })?;

        Ok(User::from(model))
    }

    async fn delete(&self, user: &User) -> Result<(), UserStoreError> {
        let result = users::Entity::delete_by_id(user.id)
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            warn!(user_id = user.id, "Delete matched no user row");
        } else {
            info!(user_id = user.id, username = %user.username, "Deleted user");
        }

        // Row before file: a crash in between orphans the file, not the row.
        self.avatars.remove(&user.profile_pic).await?;

        Ok(())
    }
}
