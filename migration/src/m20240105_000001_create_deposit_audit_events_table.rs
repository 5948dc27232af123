use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(DepositAuditEvents::Table)
                .if_not_exists()
                .col(ColumnDef::new(DepositAuditEvents::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(DepositAuditEvents::DepositId).uuid().not_null())
                .col(ColumnDef::new(DepositAuditEvents::SchemaVersion).small_integer().not_null())
                .col(ColumnDef::new(DepositAuditEvents::Event).json_binary().not_null())
                .col(
                    ColumnDef::new(DepositAuditEvents::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_deposit_audit_events_deposit_id")
                        .from(DepositAuditEvents::Table, DepositAuditEvents::DepositId)
                        .to(Deposits::Table, Deposits::Id)
                )
                .to_owned()
        ).await?;

        // Create index on deposit_id
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposit_audit_events_deposit_id")
                .table(DepositAuditEvents::Table)
                .col(DepositAuditEvents::DepositId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DepositAuditEvents::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DepositAuditEvents {
    Table,
    Id,
    DepositId,
    SchemaVersion,
    Event,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Deposits {
    Table,
    Id,
}
