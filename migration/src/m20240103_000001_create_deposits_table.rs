use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Deposits::Table)
                .if_not_exists()
                .col(ColumnDef::new(Deposits::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Deposits::UserId).uuid().not_null())
                .col(ColumnDef::new(Deposits::Amount).decimal().not_null())
                .col(ColumnDef::new(Deposits::Currency).string().not_null())
                .col(ColumnDef::new(Deposits::Network).string().not_null())
                .col(ColumnDef::new(Deposits::DepositType).string().not_null()) // "AUTOMATIC", "MANUAL_ADMIN"
                .col(ColumnDef::new(Deposits::Status).string().not_null()) // "PENDING", "CONFIRMED", "CANCELLED"
                .col(ColumnDef::new(Deposits::AdminNotes).string().null())
                .col(ColumnDef::new(Deposits::TxHash).string().null()) // automatic deposits only
                .col(
                    ColumnDef::new(Deposits::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_deposits_user_id")
                        .from(Deposits::Table, Deposits::UserId)
                        .to(Users::Table, Users::Id)
                )
                .to_owned()
        ).await?;

        // Create index on user_id
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposits_user_id")
                .table(Deposits::Table)
                .col(Deposits::UserId)
                .to_owned()
        ).await?;

        // Create index on deposit_type and created_at for the admin listing
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposits_type_created_at")
                .table(Deposits::Table)
                .col(Deposits::DepositType)
                .col(Deposits::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Deposits::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Deposits {
    Table,
    Id,
    UserId,
    Amount,
    Currency,
    Network,
    DepositType,
    Status,
    AdminNotes,
    TxHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
