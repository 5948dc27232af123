pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240102_000001_create_wallets_table;
mod m20240103_000001_create_deposits_table;
mod m20240104_000001_create_ledger_entries_table;
mod m20240105_000001_create_deposit_audit_events_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240102_000001_create_wallets_table::Migration),
            Box::new(m20240103_000001_create_deposits_table::Migration),
            Box::new(m20240104_000001_create_ledger_entries_table::Migration),
            Box::new(m20240105_000001_create_deposit_audit_events_table::Migration)
        ]
    }
}
