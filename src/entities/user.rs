use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub avatar: Option<String>,
    #[serde(skip_serializing)]
    pub reset_code: Option<String>,
    #[serde(skip_serializing)]
    pub reset_code_expires_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether `code` matches the stored reset code and `now` has not passed its expiry.
    ///
    /// The code stays valid up to and including the expiry instant.
    #[must_use]
    pub fn reset_code_is_valid(&self, code: &str, now: DateTimeWithTimeZone) -> bool {
        match (&self.reset_code, self.reset_code_expires_at) {
            (Some(stored), Some(expires_at)) => stored == code && now <= expires_at,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::subscription::Entity")]
    Subscription,
    #[sea_orm(has_one = "super::wallet::Entity")]
    Wallet,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user_with_code(code: Option<&str>, expires_at: Option<DateTimeWithTimeZone>) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password_hash: String::new(),
            is_verified: true,
            is_active: true,
            avatar: None,
            reset_code: code.map(String::from),
            reset_code_expires_at: expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn reset_code_valid_one_second_before_expiry() {
        let expiry = Utc::now().fixed_offset();
        let user = user_with_code(Some("123456"), Some(expiry));
        assert!(user.reset_code_is_valid("123456", expiry - Duration::seconds(1)));
        assert!(user.reset_code_is_valid("123456", expiry));
    }

    #[test]
    fn reset_code_invalid_one_second_after_expiry() {
        let expiry = Utc::now().fixed_offset();
        let user = user_with_code(Some("123456"), Some(expiry));
        assert!(!user.reset_code_is_valid("123456", expiry + Duration::seconds(1)));
    }

    #[test]
    fn reset_code_mismatch_or_missing_is_invalid() {
        let expiry = Utc::now().fixed_offset() + Duration::minutes(2);
        let user = user_with_code(Some("123456"), Some(expiry));
        assert!(!user.reset_code_is_valid("654321", Utc::now().fixed_offset()));

        let cleared = user_with_code(None, None);
        assert!(!cleared.reset_code_is_valid("", Utc::now().fixed_offset()));
    }
}
