//! Admin control over account status.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

use crate::entities::user;
use crate::services::{ServiceError, ServiceResult};

pub struct UserAdminService;

impl UserAdminService {
    /// Set the active flag. Banned users cannot log in or refresh.
    ///
    /// Already being in the requested state is not an error.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn set_active(
        db: &DatabaseConnection,
        user_id: i32,
        is_active: bool,
    ) -> ServiceResult<user::Model> {
        let account = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        if account.is_active == is_active {
            return Ok(account);
        }

        let mut active: user::ActiveModel = account.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(db).await?;

        tracing::info!(user_id, is_active, "account status changed");
        Ok(updated)
    }
}
