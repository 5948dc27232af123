use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(LedgerEntries::Table)
                .if_not_exists()
                .col(ColumnDef::new(LedgerEntries::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(LedgerEntries::UserId).uuid().not_null())
                .col(ColumnDef::new(LedgerEntries::Kind).string().not_null()) // "DEPOSIT", "WITHDRAWAL", "REFUND"
                .col(ColumnDef::new(LedgerEntries::Amount).decimal().not_null())
                .col(ColumnDef::new(LedgerEntries::Memo).string().not_null())
                .col(ColumnDef::new(LedgerEntries::ProvenanceId).uuid().null()) // deposit id for deposit/refund entries
                .col(ColumnDef::new(LedgerEntries::BalanceAfter).decimal().not_null())
                .col(
                    ColumnDef::new(LedgerEntries::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_ledger_entries_user_id")
                        .from(LedgerEntries::Table, LedgerEntries::UserId)
                        .to(Users::Table, Users::Id)
                )
                .to_owned()
        ).await?;

        // Create index on user_id and created_at for history queries
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_ledger_entries_user_created_at")
                .table(LedgerEntries::Table)
                .col(LedgerEntries::UserId)
                .col(LedgerEntries::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LedgerEntries::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    UserId,
    Kind,
    Amount,
    Memo,
    ProvenanceId,
    BalanceAfter,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
