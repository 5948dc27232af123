pub mod user_service;
pub mod deposit_service;
pub mod ledger_service;
pub mod notification_service;

pub use user_service::UserService;
pub use deposit_service::DepositService;
pub use ledger_service::LedgerService;
pub use notification_service::{ EmailNotifier, Notifier };
