//! Subscription → plan → usage ceilings.
//!
//! The same resolution backs both the current-user view and limit enforcement,
//! so a user always sees the ceilings that will actually be applied.

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Func, Query};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::entities::{SubscriptionStatus, plan, subscription};
use crate::services::{ServiceError, ServiceResult};

/// Ceiling applied to every resource when no plan row can be found.
pub const DEFAULT_CEILING: i32 = 20;

/// Label shown for every account that is not on an active paid plan.
pub const FREE_TIER_LABEL: &str = "Free Tier";

/// Per-resource usage ceilings. [`plan::UNLIMITED`] disables a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    pub max_customers: i32,
    pub max_products: i32,
    pub max_materials: i32,
    pub max_tasks: i32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_customers: DEFAULT_CEILING,
            max_products: DEFAULT_CEILING,
            max_materials: DEFAULT_CEILING,
            max_tasks: DEFAULT_CEILING,
        }
    }
}

impl From<&plan::Model> for Limits {
    fn from(p: &plan::Model) -> Self {
        Self {
            max_customers: p.max_customers,
            max_products: p.max_products,
            max_materials: p.max_materials,
            max_tasks: p.max_tasks,
        }
    }
}

/// What a user is entitled to right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlements {
    pub limits: Limits,
    pub is_pro: bool,
    /// Product id when on a paid plan, otherwise [`FREE_TIER_LABEL`].
    pub plan: String,
}

/// Product id the subscription points at, defaulting to the free tier.
fn effective_product_id(sub: Option<&subscription::Model>) -> &str {
    match sub {
        Some(s) if !s.product_id.is_empty() => &s.product_id,
        _ => plan::FREE_TIER,
    }
}

async fn find_plan<C: ConnectionTrait>(
    db: &C,
    product_id: &str,
) -> Result<Option<plan::Model>, DbErr> {
    plan::Entity::find()
        .filter(plan::Column::ProductId.eq(product_id))
        .one(db)
        .await
}

/// Resolve the ceilings for a subscription.
///
/// Falls back to the `free_tier` plan when the product has no plan row, and to
/// [`DEFAULT_CEILING`] when that row is missing too.
///
/// # Errors
///
/// Returns the database error if a plan lookup fails.
pub async fn resolve_limits<C: ConnectionTrait>(
    db: &C,
    sub: Option<&subscription::Model>,
) -> Result<Limits, DbErr> {
    let product_id = effective_product_id(sub);

    if let Some(p) = find_plan(db, product_id).await? {
        return Ok(Limits::from(&p));
    }
    if product_id != plan::FREE_TIER {
        tracing::warn!(product_id, "no plan for product, using free tier");
        if let Some(p) = find_plan(db, plan::FREE_TIER).await? {
            return Ok(Limits::from(&p));
        }
    }
    Ok(Limits::default())
}

/// Resolve the full entitlement picture for a subscription.
///
/// # Errors
///
/// Returns the database error if a plan lookup fails.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    sub: Option<&subscription::Model>,
) -> Result<Entitlements, DbErr> {
    let limits = resolve_limits(db, sub).await?;

    let (is_pro, label) = match sub {
        Some(s) if s.status() == SubscriptionStatus::Active && s.product_id != plan::FREE_TIER => {
            (true, s.product_id.clone())
        }
        _ => (false, FREE_TIER_LABEL.to_string()),
    };

    Ok(Entitlements {
        limits,
        is_pro,
        plan: label,
    })
}

/// Load the subscription row for a user, if any.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn subscription_for<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<subscription::Model>, DbErr> {
    subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .one(db)
        .await
}

// ─────────────────────────────────────────────────────────────────────────────
// Enforcement
// ─────────────────────────────────────────────────────────────────────────────

/// Resource families that count against a plan ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Customers,
    Products,
    Materials,
    Tasks,
}

impl ResourceKind {
    /// Table holding the user's rows for this resource.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Customers => "customer",
            Self::Products => "product",
            Self::Materials => "material",
            Self::Tasks => "task",
        }
    }

    #[must_use]
    pub const fn ceiling(self, limits: &Limits) -> i32 {
        match self {
            Self::Customers => limits.max_customers,
            Self::Products => limits.max_products,
            Self::Materials => limits.max_materials,
            Self::Tasks => limits.max_tasks,
        }
    }
}

/// Counts how many rows of a resource a user currently owns.
#[async_trait]
pub trait UsageCounter: Send + Sync {
    async fn count(&self, user_id: i32, kind: ResourceKind) -> Result<u64, DbErr>;
}

/// Counts rows with `SELECT COUNT(*) FROM <table> WHERE user_id = ?`.
///
/// The resource tables belong to the CRUD features and are not created by this crate's
/// migrations; they only need a `user_id` column.
#[derive(Debug, Clone)]
pub struct SqlUsageCounter {
    db: DatabaseConnection,
}

impl SqlUsageCounter {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsageCounter for SqlUsageCounter {
    async fn count(&self, user_id: i32, kind: ResourceKind) -> Result<u64, DbErr> {
        let query = Query::select()
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("count"))
            .from(Alias::new(kind.table()))
            .and_where(Expr::col(Alias::new("user_id")).eq(user_id))
            .to_owned();
        let stmt = self.db.get_database_backend().build(&query);

        let count = match self.db.query_one(stmt).await? {
            Some(row) => row.try_get::<i64>("", "count")?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Fail with [`ServiceError::LimitReached`] if the user may not create another `kind`.
///
/// The check and the caller's insert are separate statements, so two concurrent
/// creates can both pass at `ceiling - 1`.
///
/// # Errors
///
/// `LimitReached` when at or above the ceiling, `Database` on lookup failure.
pub async fn ensure_within_limit<C: ConnectionTrait>(
    db: &C,
    counter: &dyn UsageCounter,
    user_id: i32,
    kind: ResourceKind,
) -> ServiceResult<()> {
    let sub = subscription_for(db, user_id).await?;
    let ceiling = kind.ceiling(&resolve_limits(db, sub.as_ref()).await?);

    if ceiling == plan::UNLIMITED {
        return Ok(());
    }

    let used = counter.count(user_id, kind).await?;
    if used >= u64::try_from(ceiling).unwrap_or_default() {
        tracing::debug!(user_id, ?kind, used, ceiling, "plan limit reached");
        return Err(ServiceError::LimitReached(ceiling));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sub(product_id: &str, status: SubscriptionStatus) -> subscription::Model {
        let now = Utc::now().fixed_offset();
        subscription::Model {
            id: 1,
            user_id: 1,
            product_id: product_id.to_string(),
            status: status.as_str().to_string(),
            expires_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_product_means_free_tier() {
        assert_eq!(effective_product_id(None), plan::FREE_TIER);
        let s = sub("", SubscriptionStatus::Active);
        assert_eq!(effective_product_id(Some(&s)), plan::FREE_TIER);
        let s = sub("pro_monthly", SubscriptionStatus::Expired);
        assert_eq!(effective_product_id(Some(&s)), "pro_monthly");
    }

    #[test]
    fn ceilings_by_kind() {
        let limits = Limits {
            max_customers: 1,
            max_products: 2,
            max_materials: 3,
            max_tasks: plan::UNLIMITED,
        };
        assert_eq!(ResourceKind::Customers.ceiling(&limits), 1);
        assert_eq!(ResourceKind::Materials.ceiling(&limits), 3);
        assert_eq!(ResourceKind::Tasks.ceiling(&limits), -1);
        assert_eq!(ResourceKind::Products.table(), "product");
    }

    #[test]
    fn default_limits_are_twenty() {
        let limits = Limits::default();
        assert_eq!(limits.max_customers, 20);
        assert_eq!(limits.max_tasks, 20);
    }
}
