pub mod user;
pub mod wallet;
pub mod deposit;
pub mod ledger_entry;
pub mod deposit_audit_event;

pub use user::Entity as User;
pub use wallet::Entity as Wallet;
pub use deposit::Entity as Deposit;
pub use ledger_entry::Entity as LedgerEntry;
pub use deposit_audit_event::Entity as DepositAuditEventEntity;
