use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Wallets::Table)
                .if_not_exists()
                .col(ColumnDef::new(Wallets::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Wallets::UserId).uuid().not_null())
                .col(ColumnDef::new(Wallets::Balance).decimal().not_null().default(0))
                .col(ColumnDef::new(Wallets::TotalDeposits).decimal().not_null().default(0))
                .col(ColumnDef::new(Wallets::TotalWithdrawals).decimal().not_null().default(0))
                .col(
                    ColumnDef::new(Wallets::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_wallets_user_id")
                        .from(Wallets::Table, Wallets::UserId)
                        .to(Users::Table, Users::Id)
                )
                .to_owned()
        ).await?;

        // One wallet per user
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_wallets_user_id")
                .table(Wallets::Table)
                .col(Wallets::UserId)
                .unique()
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    Balance,
    TotalDeposits,
    TotalWithdrawals,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
