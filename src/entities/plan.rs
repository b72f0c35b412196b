use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ceiling value meaning "no limit".
pub const UNLIMITED: i32 = -1;

/// Product id of the plan every account falls back to.
pub const FREE_TIER: &str = "free_tier";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plan")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub product_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub benefits: Json,
    pub max_customers: i32,
    pub max_products: i32,
    pub max_materials: i32,
    pub max_tasks: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
