use crate::{
    entities::{user, User, UserModel},
    errors::ServiceError,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;

/// Admin-facing user directory. Registration and authentication live in
/// the identity system; this service only reads.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> Result<Vec<UserModel>, ServiceError> {
        Ok(User::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
