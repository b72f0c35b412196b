use sea_orm_migration::prelude::*;

/// Creates the `plan` table. A ceiling of `-1` means unlimited.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Plan {
    Table,
    Id,
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

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plan::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Plan::ProductId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Plan::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Plan::Description).text().not_null())
                    .col(ColumnDef::new(Plan::Price).double().not_null().default(0.0))
                    .col(ColumnDef::new(Plan::Benefits).json().not_null())
                    .col(
                        ColumnDef::new(Plan::MaxCustomers)
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(
                        ColumnDef::new(Plan::MaxProducts)
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(
                        ColumnDef::new(Plan::MaxMaterials)
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(ColumnDef::new(Plan::MaxTasks).integer().not_null().default(20))
                    .col(
                        ColumnDef::new(Plan::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Plan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Plan::Table).to_owned())
            .await
    }
}
