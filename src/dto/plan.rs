use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::format_timestamp;
use crate::entities::plan;

/// POST /api/v1/plans
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub max_customers: i32,
    pub max_products: i32,
    pub max_materials: i32,
    pub max_tasks: i32,
    /// Defaults to `true` when omitted.
    pub is_active: Option<bool>,
}

/// PUT /api/v1/plans/{id}. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub benefits: Option<Vec<String>>,
    pub max_customers: Option<i32>,
    pub max_products: Option<i32>,
    pub max_materials: Option<i32>,
    pub max_tasks: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: i32,
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub benefits: JsonValue,
    pub max_customers: i32,
    pub max_products: i32,
    pub max_materials: i32,
    pub max_tasks: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<plan::Model> for PlanResponse {
    fn from(p: plan::Model) -> Self {
        Self {
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
            id: p.id,
            product_id: p.product_id,
            title: p.title,
            description: p.description,
            price: p.price,
            benefits: p.benefits,
            max_customers: p.max_customers,
            max_products: p.max_products,
            max_materials: p.max_materials,
            max_tasks: p.max_tasks,
            is_active: p.is_active,
        }
    }
}
