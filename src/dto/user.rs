use serde::Serialize;

use super::format_timestamp;
use crate::entities::user;
use crate::services::entitlements::Entitlements;

/// Current-user view: profile fields plus the plan the user is entitled to.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
    pub is_pro: bool,
    pub plan: String,
    pub max_customers: i32,
    pub max_products: i32,
    pub max_materials: i32,
    pub max_tasks: i32,
    pub roles: Vec<String>,
}

impl UserResponse {
    #[must_use]
    pub fn new(u: &user::Model, entitlements: Entitlements, roles: Vec<String>) -> Self {
        let limits = entitlements.limits;
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            avatar: u.avatar.clone(),
            is_verified: u.is_verified,
            created_at: format_timestamp(&u.created_at),
            updated_at: format_timestamp(&u.updated_at),
            is_pro: entitlements.is_pro,
            plan: entitlements.plan,
            max_customers: limits.max_customers,
            max_products: limits.max_products,
            max_materials: limits.max_materials,
            max_tasks: limits.max_tasks,
            roles,
        }
    }
}

/// Returned by the admin ban/activate endpoints.
#[derive(Debug, Serialize)]
pub struct AccountStatusResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub updated_at: String,
}

impl From<&user::Model> for AccountStatusResponse {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            is_verified: u.is_verified,
            is_active: u.is_active,
            updated_at: format_timestamp(&u.updated_at),
        }
    }
}
