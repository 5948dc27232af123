use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Users::FullName).string().not_null())
                .col(ColumnDef::new(Users::Email).string().not_null())
                .col(ColumnDef::new(Users::Phone).string().null())
                .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        // Create unique index on email
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_email")
                .table(Users::Table)
                .col(Users::Email)
                .unique()
                .to_owned()
        ).await?;

        // Create index on is_active for the admin user listing
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_is_active")
                .table(Users::Table)
                .col(Users::IsActive)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    IsActive,
    CreatedAt,
}
