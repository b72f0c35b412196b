pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_role_table;
mod m20260301_000002_create_user_table;
mod m20260301_000003_create_user_role_table;
mod m20260301_000004_create_plan_table;
mod m20260301_000005_create_subscription_table;
mod m20260301_000006_create_wallet_table;
mod m20260301_000007_create_verification_code_table;
mod m20260301_000008_create_session_table;
mod m20260301_000009_seed_roles;
mod m20260301_000010_seed_free_tier_plan;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_role_table::Migration),
            Box::new(m20260301_000002_create_user_table::Migration),
            Box::new(m20260301_000003_create_user_role_table::Migration),
            Box::new(m20260301_000004_create_plan_table::Migration),
            Box::new(m20260301_000005_create_subscription_table::Migration),
            Box::new(m20260301_000006_create_wallet_table::Migration),
            Box::new(m20260301_000007_create_verification_code_table::Migration),
            Box::new(m20260301_000008_create_session_table::Migration),
            Box::new(m20260301_000009_seed_roles::Migration),
            Box::new(m20260301_000010_seed_free_tier_plan::Migration),
        ]
    }
}
