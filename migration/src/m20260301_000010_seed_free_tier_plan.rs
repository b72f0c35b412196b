use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::JsonValue;

/// Seeds the `free_tier` plan every new account starts on.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Plan {
    Table,
    ProductId,
    Title,
    Description,
    Price,
    Benefits,
    MaxCustomers,
    MaxProducts,
    MaxMaterials,
    MaxTasks,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

const FREE_TIER: &str = "free_tier";
const FREE_TIER_LIMIT: i32 = 20;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().fixed_offset();
        let benefits = JsonValue::Array(
            [
                "20 Customer Limit",
                "20 Product Limit",
                "20 Material Limit",
                "20 Task Limit",
            ]
            .iter()
            .map(|b| JsonValue::String((*b).to_string()))
            .collect(),
        );

        let mut insert = Query::insert();
        insert
            .into_table(Plan::Table)
            .columns([
                Plan::ProductId,
                Plan::Title,
                Plan::Description,
                Plan::Price,
                Plan::Benefits,
                Plan::MaxCustomers,
                Plan::MaxProducts,
                Plan::MaxMaterials,
                Plan::MaxTasks,
                Plan::IsActive,
                Plan::CreatedAt,
                Plan::UpdatedAt,
            ])
            .values([
                FREE_TIER.into(),
                "Free Tier".into(),
                "Starter plan for new users".into(),
                0.0_f64.into(),
                benefits.into(),
                FREE_TIER_LIMIT.into(),
                FREE_TIER_LIMIT.into(),
                FREE_TIER_LIMIT.into(),
                FREE_TIER_LIMIT.into(),
                true.into(),
                now.into(),
                now.into(),
            ])
            .map_err(|e| DbErr::Migration(e.to_string()))?
            .on_conflict(OnConflict::column(Plan::ProductId).do_nothing().to_owned());

        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Plan::Table)
                    .and_where(Expr::col(Plan::ProductId).eq(FREE_TIER))
                    .to_owned(),
            )
            .await
    }
}
