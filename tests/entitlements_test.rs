mod common;

use anyhow::Context;
use async_trait::async_trait;
use axum::http::StatusCode;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use serde_json::json;

use common::{TestApp, now};
use tailorbook_api::entities::{SubscriptionStatus, plan, subscription};
use tailorbook_api::services::entitlements::{self, ResourceKind, SqlUsageCounter, UsageCounter};
use tailorbook_api::services::{ServiceError, ensure_within_limit};

/// Counter that reports a fixed usage regardless of the table contents.
struct FixedCounter(u64);

#[async_trait]
impl UsageCounter for FixedCounter {
    async fn count(&self, _user_id: i32, _kind: ResourceKind) -> Result<u64, DbErr> {
        Ok(self.0)
    }
}

async fn insert_plan(db: &DatabaseConnection, product_id: &str, max_customers: i32) -> anyhow::Result<()> {
    plan::ActiveModel {
        product_id: Set(product_id.to_string()),
        title: Set(product_id.to_string()),
        description: Set(String::new()),
        price: Set(9.99),
        benefits: Set(json!([])),
        max_customers: Set(max_customers),
        max_products: Set(50),
        max_materials: Set(50),
        max_tasks: Set(plan::UNLIMITED),
        is_active: Set(true),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Point the user's subscription at `product_id` with `status`.
async fn subscribe(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: &str,
    status: SubscriptionStatus,
) -> anyhow::Result<subscription::Model> {
    let sub = subscription::Entity::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .context("subscription missing")?;
    let mut active: subscription::ActiveModel = sub.into();
    active.product_id = Set(product_id.to_string());
    active.status = Set(status.as_str().to_string());
    active.expires_at = Set(now() + chrono::Duration::days(30));
    Ok(active.update(db).await?)
}

async fn create_customer_table(db: &DatabaseConnection) -> anyhow::Result<()> {
    db.execute_unprepared(
        "CREATE TABLE customer (id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INTEGER NOT NULL, name TEXT NOT NULL)",
    )
    .await?;
    Ok(())
}

async fn add_customer(db: &DatabaseConnection, user_id: i32, name: &str) -> anyhow::Result<()> {
    db.execute_unprepared(&format!(
        "INSERT INTO customer (user_id, name) VALUES ({user_id}, '{name}')"
    ))
    .await?;
    Ok(())
}

async fn verified_user(app: &TestApp, email: &str) -> anyhow::Result<i32> {
    common::register_verified(app, "Owner", email, "secret1").await;
    Ok(common::find_user(app.db(), email).await.context("user missing")?.id)
}

// ──────────────────────────────────────────────────────────────────────────────
// Resolution
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn active_paid_subscription_is_pro() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "pro_monthly", 500).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;
    let sub = subscribe(app.db(), user_id, "pro_monthly", SubscriptionStatus::Active).await?;

    let resolved = entitlements::resolve(app.db(), Some(&sub)).await?;
    assert!(resolved.is_pro);
    assert_eq!(resolved.plan, "pro_monthly");
    assert_eq!(resolved.limits.max_customers, 500);
    assert_eq!(resolved.limits.max_tasks, plan::UNLIMITED);
    Ok(())
}

#[tokio::test]
async fn lapsed_subscription_keeps_plan_limits_but_is_not_pro() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "pro_monthly", 500).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;

    for status in [SubscriptionStatus::Expired, SubscriptionStatus::GracePeriod] {
        let sub = subscribe(app.db(), user_id, "pro_monthly", status).await?;
        let resolved = entitlements::resolve(app.db(), Some(&sub)).await?;
        assert!(!resolved.is_pro);
        assert_eq!(resolved.plan, "Free Tier");
        assert_eq!(resolved.limits.max_customers, 500);
    }
    Ok(())
}

#[tokio::test]
async fn active_free_tier_is_not_pro() -> anyhow::Result<()> {
    let app = common::test_app().await;
    let user_id = verified_user(&app, "ana@x.com").await?;
    let sub = subscribe(app.db(), user_id, plan::FREE_TIER, SubscriptionStatus::Active).await?;

    let resolved = entitlements::resolve(app.db(), Some(&sub)).await?;
    assert!(!resolved.is_pro);
    assert_eq!(resolved.plan, "Free Tier");
    Ok(())
}

#[tokio::test]
async fn unknown_product_falls_back_to_free_tier_plan() -> anyhow::Result<()> {
    let app = common::test_app().await;
    let free = plan::Entity::find()
        .filter(plan::Column::ProductId.eq(plan::FREE_TIER))
        .one(app.db())
        .await?
        .context("free tier plan not seeded")?;
    let mut active: plan::ActiveModel = free.into();
    active.max_customers = Set(7);
    active.update(app.db()).await?;

    let user_id = verified_user(&app, "ana@x.com").await?;
    let sub = subscribe(app.db(), user_id, "retired_product", SubscriptionStatus::Active).await?;

    let limits = entitlements::resolve_limits(app.db(), Some(&sub)).await?;
    assert_eq!(limits.max_customers, 7);
    Ok(())
}

#[tokio::test]
async fn missing_subscription_and_plans_use_builtin_default() -> anyhow::Result<()> {
    let app = common::test_app().await;
    plan::Entity::delete_many().exec(app.db()).await?;

    let limits = entitlements::resolve_limits(app.db(), None).await?;
    assert_eq!(limits, entitlements::Limits::default());
    Ok(())
}

#[tokio::test]
async fn me_reflects_paid_plan() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "pro_monthly", 500).await?;
    let login = common::register_verified(&app, "Ana", "ana@x.com", "secret1").await;
    let token = login["access_token"].as_str().unwrap_or_default();
    let user_id = i32::try_from(login["user"]["id"].as_i64().unwrap_or_default())?;
    subscribe(app.db(), user_id, "pro_monthly", SubscriptionStatus::Active).await?;

    let (status, body) = common::get_auth(&app.router, "/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    let body = common::json(&body);
    assert_eq!(body["is_pro"], true);
    assert_eq!(body["plan"], "pro_monthly");
    assert_eq!(body["max_customers"], 500);
    assert_eq!(body["max_tasks"], -1);
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// Enforcement
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn limit_blocks_at_ceiling() -> anyhow::Result<()> {
    let app = common::test_app().await;
    create_customer_table(app.db()).await?;
    insert_plan(app.db(), "starter", 2).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;
    subscribe(app.db(), user_id, "starter", SubscriptionStatus::Active).await?;
    let counter = SqlUsageCounter::new(app.db().clone());

    for name in ["first", "second"] {
        ensure_within_limit(app.db(), &counter, user_id, ResourceKind::Customers).await?;
        add_customer(app.db(), user_id, name).await?;
    }

    let third = ensure_within_limit(app.db(), &counter, user_id, ResourceKind::Customers).await;
    assert!(matches!(third, Err(ServiceError::LimitReached(2))));
    Ok(())
}

#[tokio::test]
async fn other_users_rows_do_not_count() -> anyhow::Result<()> {
    let app = common::test_app().await;
    create_customer_table(app.db()).await?;
    insert_plan(app.db(), "starter", 2).await?;
    let ana = verified_user(&app, "ana@x.com").await?;
    let bea = verified_user(&app, "bea@x.com").await?;
    subscribe(app.db(), ana, "starter", SubscriptionStatus::Active).await?;
    for name in ["a", "b", "c"] {
        add_customer(app.db(), bea, name).await?;
    }

    let counter = SqlUsageCounter::new(app.db().clone());
    assert_eq!(counter.count(ana, ResourceKind::Customers).await?, 0);
    assert_eq!(counter.count(bea, ResourceKind::Customers).await?, 3);
    ensure_within_limit(app.db(), &counter, ana, ResourceKind::Customers).await?;
    Ok(())
}

#[tokio::test]
async fn unlimited_never_counts() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "studio", 2).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;
    subscribe(app.db(), user_id, "studio", SubscriptionStatus::Active).await?;

    // Tasks are unlimited on this plan; no task table exists, so counting would fail.
    let counter = SqlUsageCounter::new(app.db().clone());
    ensure_within_limit(app.db(), &counter, user_id, ResourceKind::Tasks).await?;
    ensure_within_limit(app.db(), &FixedCounter(1_000_000), user_id, ResourceKind::Tasks).await?;
    Ok(())
}

#[tokio::test]
async fn zero_ceiling_blocks_everything() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "locked", 0).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;
    subscribe(app.db(), user_id, "locked", SubscriptionStatus::Active).await?;

    let result = ensure_within_limit(app.db(), &FixedCounter(0), user_id, ResourceKind::Customers).await;
    assert!(matches!(result, Err(ServiceError::LimitReached(0))));
    Ok(())
}

#[tokio::test]
async fn concurrent_checks_can_both_pass_below_ceiling() -> anyhow::Result<()> {
    let app = common::test_app().await;
    insert_plan(app.db(), "starter", 2).await?;
    let user_id = verified_user(&app, "ana@x.com").await?;
    subscribe(app.db(), user_id, "starter", SubscriptionStatus::Active).await?;

    // Both callers observe one existing row before either inserts. The check is
    // not atomic with the insert, so both are admitted and usage ends at 3.
    let counter = FixedCounter(1);
    let (first, second) = tokio::join!(
        ensure_within_limit(app.db(), &counter, user_id, ResourceKind::Customers),
        ensure_within_limit(app.db(), &counter, user_id, ResourceKind::Customers),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());
    Ok(())
}
