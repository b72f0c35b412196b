use sea_orm_migration::prelude::*;

/// Seeds the fixed role set. Roles are immutable after this point.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Role {
    Table,
    Name,
    Description,
}

const ROLES: &[(&str, &str)] = &[
    ("admin", "Full access to plans and user administration"),
    ("member", "Default role for registered workshop accounts"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Role::Table)
            .columns([Role::Name, Role::Description]);

        for (name, description) in ROLES {
            insert
                .values([(*name).into(), (*description).into()])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }

        insert.on_conflict(OnConflict::column(Role::Name).do_nothing().to_owned());

        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names = ROLES.iter().map(|(name, _)| *name);
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Role::Table)
                    .and_where(Expr::col(Role::Name).is_in(names))
                    .to_owned(),
            )
            .await
    }
}
