//! Plan catalogue administration.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde_json::Value as JsonValue;

use crate::dto::{CreatePlanRequest, UpdatePlanRequest};
use crate::entities::plan;
use crate::services::{ServiceError, ServiceResult};

/// A ceiling is either [`plan::UNLIMITED`] or a non-negative count.
fn validate_ceiling(field: &str, value: i32) -> ServiceResult<()> {
    if value < plan::UNLIMITED {
        return Err(ServiceError::Validation(format!(
            "{field} must be -1 (unlimited) or a non-negative number"
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> ServiceResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ServiceError::Validation("price must be zero or more".to_string()));
    }
    Ok(())
}

fn benefits_json(benefits: Vec<String>) -> JsonValue {
    JsonValue::Array(benefits.into_iter().map(JsonValue::String).collect())
}

pub struct PlanService;

impl PlanService {
    /// Active plans, cheapest first.
    ///
    /// # Errors
    ///
    /// `Database` if the query fails.
    pub async fn list_active(db: &DatabaseConnection) -> ServiceResult<Vec<plan::Model>> {
        Ok(plan::Entity::find()
            .filter(plan::Column::IsActive.eq(true))
            .order_by_asc(plan::Column::Price)
            .order_by_asc(plan::Column::Id)
            .all(db)
            .await?)
    }

    /// Every plan, inactive ones included, for administration.
    ///
    /// # Errors
    ///
    /// `Database` if the query fails.
    pub async fn list_all(db: &DatabaseConnection) -> ServiceResult<Vec<plan::Model>> {
        Ok(plan::Entity::find()
            .order_by_asc(plan::Column::Id)
            .all(db)
            .await?)
    }

    /// # Errors
    ///
    /// `Validation` on bad fields, `Conflict` if the product id already has a plan.
    pub async fn create(
        db: &DatabaseConnection,
        req: CreatePlanRequest,
    ) -> ServiceResult<plan::Model> {
        let product_id = req.product_id.trim().to_string();
        if product_id.is_empty() {
            return Err(ServiceError::Validation("product_id is required".to_string()));
        }
        if req.title.trim().is_empty() {
            return Err(ServiceError::Validation("title is required".to_string()));
        }
        validate_price(req.price)?;
        validate_ceiling("max_customers", req.max_customers)?;
        validate_ceiling("max_products", req.max_products)?;
        validate_ceiling("max_materials", req.max_materials)?;
        validate_ceiling("max_tasks", req.max_tasks)?;

        let existing = plan::Entity::find()
            .filter(plan::Column::ProductId.eq(&product_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "a plan for product {product_id} already exists"
            )));
        }

        let now = Utc::now().fixed_offset();
        let created = plan::ActiveModel {
            product_id: Set(product_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            price: Set(req.price),
            benefits: Set(benefits_json(req.benefits)),
            max_customers: Set(req.max_customers),
            max_products: Set(req.max_products),
            max_materials: Set(req.max_materials),
            max_tasks: Set(req.max_tasks),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(plan_id = created.id, product_id = %created.product_id, "plan created");
        Ok(created)
    }

    /// Apply the fields present in `req`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Validation` on bad fields.
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        req: UpdatePlanRequest,
    ) -> ServiceResult<plan::Model> {
        let existing = Self::find(db, id).await?;
        let mut active: plan::ActiveModel = existing.into();

        if let Some(title) = req.title {
            if title.trim().is_empty() {
                return Err(ServiceError::Validation("title cannot be empty".to_string()));
            }
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = req.description {
            active.description = Set(description);
        }
        if let Some(price) = req.price {
            validate_price(price)?;
            active.price = Set(price);
        }
        if let Some(benefits) = req.benefits {
            active.benefits = Set(benefits_json(benefits));
        }
        for (field, value, column) in [
            ("max_customers", req.max_customers, &mut active.max_customers),
            ("max_products", req.max_products, &mut active.max_products),
            ("max_materials", req.max_materials, &mut active.max_materials),
            ("max_tasks", req.max_tasks, &mut active.max_tasks),
        ] {
            if let Some(v) = value {
                validate_ceiling(field, v)?;
                *column = Set(v);
            }
        }
        if let Some(is_active) = req.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Utc::now().fixed_offset());
        Ok(active.update(db).await?)
    }

    /// Toggle availability. Setting the current value again is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn set_active(
        db: &DatabaseConnection,
        id: i32,
        is_active: bool,
    ) -> ServiceResult<plan::Model> {
        let existing = Self::find(db, id).await?;
        if existing.is_active == is_active {
            return Ok(existing);
        }

        let mut active: plan::ActiveModel = existing.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().fixed_offset());
        let updated = active.update(db).await?;
        tracing::info!(plan_id = id, is_active, "plan availability changed");
        Ok(updated)
    }

    async fn find(db: &DatabaseConnection, id: i32) -> ServiceResult<plan::Model> {
        plan::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("plan not found".to_string()))
    }
}
