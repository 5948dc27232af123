use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ DatabaseConnection, TransactionTrait };
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AdminIdentity;
use crate::db::entity::deposit_audit_event::DepositAuditEvent;
use crate::db::entity::{ deposit, user };
use crate::db::{ DepositRepository, ManualDepositFilter, UserRepository };
use crate::enums::{ Currency, DepositStatus, DepositType, Network, WalletOperationKind };
use crate::error::{ AppError, Result };
use crate::services::{ LedgerService, Notifier };

/// Longest accepted admin note / cancellation reason.
pub const MAX_NOTES_LEN: usize = 500;

pub struct CreateManualDepositInput {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub network: String,
    pub notes: Option<String>,
    pub send_email: bool,
}

#[derive(Debug)]
pub struct CreatedManualDeposit {
    pub deposit: deposit::Model,
    pub user: user::Model,
    /// Post-operation balance as reported by the ledger service.
    pub new_balance: Decimal,
}

#[derive(Debug)]
pub struct CancelledManualDeposit {
    pub deposit: deposit::Model,
    pub refunded: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct StatsBucket {
    pub amount: Decimal,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ManualDepositStats {
    pub total: StatsBucket,
    pub by_currency: HashMap<String, StatsBucket>,
    pub by_network: HashMap<String, StatsBucket>,
}

pub struct DepositService {
    db: DatabaseConnection,
    user_repo: Arc<UserRepository>,
    deposit_repo: Arc<DepositRepository>,
    ledger: Arc<LedgerService>,
    notifier: Arc<dyn Notifier>,
}

impl DepositService {
    pub fn new(
        db: DatabaseConnection,
        user_repo: Arc<UserRepository>,
        deposit_repo: Arc<DepositRepository>,
        ledger: Arc<LedgerService>,
        notifier: Arc<dyn Notifier>
    ) -> Self {
        Self {
            db,
            user_repo,
            deposit_repo,
            ledger,
            notifier,
        }
    }

    /// Credit a wallet by admin action. The deposit row, its audit event and
    /// the ledger mutation commit in one transaction; the confirmation email
    /// goes out only after the commit and never affects the result.
    pub async fn create_manual_deposit(
        &self,
        admin: &AdminIdentity,
        input: CreateManualDepositInput
    ) -> Result<CreatedManualDeposit> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::validation_field("amount", "Amount must be positive"));
        }

        let currency: Currency = input.currency
            .parse()
            .map_err(|e: AppError| e.with_field("currency"))?;
        let network: Network = input.network
            .parse()
            .map_err(|e: AppError| e.with_field("network"))?;

        if let Some(notes) = &input.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(
                    AppError::validation_field(
                        "notes",
                        format!("Notes cannot exceed {} characters", MAX_NOTES_LEN)
                    )
                );
            }
        }

        let user = self.user_repo.find_by_id(input.user_id).await?;
        if !user.is_active {
            return Err(AppError::InvalidState("User account is inactive".to_string()));
        }

        let txn = self.db.begin().await?;

        let deposit = self.deposit_repo.create_manual(
            &txn,
            user.id,
            input.amount,
            currency,
            network,
            input.notes.clone()
        ).await?;

        self.deposit_repo.append_audit_event(
            &txn,
            deposit.id,
            &(DepositAuditEvent::ManualCredit {
                admin_id: admin.id.clone(),
                admin_email: admin.email.clone(),
                at: Utc::now(),
            })
        ).await?;

        let wallet = self.ledger.apply_wallet_operation(
            &txn,
            user.id,
            input.amount,
            WalletOperationKind::Deposit,
            &format!("Manual deposit credited by {}", admin.email),
            Some(deposit.id)
        ).await?;

        txn.commit().await?;

        tracing::info!(
            deposit_id = %deposit.id,
            user_id = %user.id,
            amount = %deposit.amount,
            admin = %admin.email,
            "manual deposit created"
        );

        if input.send_email {
            self.spawn_notification(
                user.email.clone(),
                "Deposit credited to your wallet".to_string(),
                "manual-deposit-confirmation",
                json!({
                    "full_name": user.full_name,
                    "amount": deposit.amount,
                    "currency": deposit.currency,
                    "network": deposit.network,
                    "new_balance": wallet.balance,
                })
            );
        }

        Ok(CreatedManualDeposit {
            deposit,
            user,
            new_balance: wallet.balance,
        })
    }

    /// Cancel a manual deposit, optionally clawing part or all of the
    /// credited amount back out of the wallet. Status flip, audit event and
    /// refund commit together.
    pub async fn cancel_manual_deposit(
        &self,
        admin: &AdminIdentity,
        deposit_id: Uuid,
        reason: String,
        refund_amount: Option<Decimal>
    ) -> Result<CancelledManualDeposit> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(AppError::validation_field("reason", "Cancellation reason is required"));
        }
        if reason.chars().count() > MAX_NOTES_LEN {
            return Err(
                AppError::validation_field(
                    "reason",
                    format!("Reason cannot exceed {} characters", MAX_NOTES_LEN)
                )
            );
        }

        let deposit = self.deposit_repo.find_by_id(deposit_id).await?;

        if deposit.deposit_type != DepositType::ManualAdmin.as_str() {
            return Err(
                AppError::InvalidState("Only manual admin deposits can be cancelled".to_string())
            );
        }
        if deposit.status == DepositStatus::Cancelled.as_str() {
            return Err(AppError::InvalidState("Deposit is already cancelled".to_string()));
        }

        if let Some(refund) = refund_amount {
            if refund <= Decimal::ZERO {
                return Err(
                    AppError::validation_field("refund_amount", "Refund amount must be positive")
                );
            }
            if refund > deposit.amount {
                return Err(
                    AppError::validation_field(
                        "refund_amount",
                        "Refund amount cannot exceed the original deposit amount"
                    )
                );
            }
        }

        let user = self.user_repo.find_by_id(deposit.user_id).await?;

        let txn = self.db.begin().await?;

        let cancelled = self.deposit_repo.set_cancelled(&txn, deposit).await?;

        self.deposit_repo.append_audit_event(
            &txn,
            cancelled.id,
            &(DepositAuditEvent::Cancelled {
                admin_id: admin.id.clone(),
                admin_email: admin.email.clone(),
                reason: reason.clone(),
                refund_amount,
                at: Utc::now(),
            })
        ).await?;

        if let Some(refund) = refund_amount {
            self.ledger.apply_wallet_operation(
                &txn,
                cancelled.user_id,
                refund,
                WalletOperationKind::Refund,
                &format!("Refund for cancelled deposit {}", cancelled.id),
                Some(cancelled.id)
            ).await?;
        }

        txn.commit().await?;

        tracing::info!(
            deposit_id = %cancelled.id,
            user_id = %cancelled.user_id,
            refund = ?refund_amount,
            admin = %admin.email,
            "manual deposit cancelled"
        );

        self.spawn_notification(
            user.email.clone(),
            "Your deposit was cancelled".to_string(),
            "manual-deposit-cancellation",
            json!({
                "full_name": user.full_name,
                "amount": cancelled.amount,
                "currency": cancelled.currency,
                "reason": reason,
                "refund_amount": refund_amount,
            })
        );

        Ok(CancelledManualDeposit {
            deposit: cancelled,
            refunded: refund_amount,
        })
    }

    pub async fn list_manual_deposits(
        &self,
        page: u64,
        limit: u64,
        filter: ManualDepositFilter
    ) -> Result<(Vec<(deposit::Model, Option<user::Model>)>, u64)> {
        self.deposit_repo.list_manual(page, limit, filter).await
    }

    pub async fn get_manual_deposit_stats(&self) -> Result<ManualDepositStats> {
        let aggregates = self.deposit_repo.manual_aggregates().await?;

        let bucketize = |rows: Vec<(String, Decimal, u64)>| {
            rows.into_iter()
                .map(|(bucket, amount, count)| (bucket, StatsBucket { amount, count }))
                .collect::<HashMap<_, _>>()
        };

        Ok(ManualDepositStats {
            total: StatsBucket {
                amount: aggregates.total_amount,
                count: aggregates.total_count,
            },
            by_currency: bucketize(aggregates.by_currency),
            by_network: bucketize(aggregates.by_network),
        })
    }

    fn spawn_notification(
        &self,
        to: String,
        subject: String,
        template: &'static str,
        data: serde_json::Value
    ) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&to, &subject, template, data).await {
                tracing::warn!(template, error = %e, "failed to send notification email");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sea_orm::{ DatabaseBackend, MockDatabase };

    use crate::db::entity::{ deposit_audit_event, ledger_entry, wallet };

    use super::*;

    struct NoopNotifier;

    #[async_trait]
    impl Notifier for NoopNotifier {
        async fn send(
            &self,
            _to: &str,
            _subject: &str,
            _template: &str,
            _data: serde_json::Value
        ) -> Result<()> {
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(
            &self,
            _to: &str,
            _subject: &str,
            _template: &str,
            _data: serde_json::Value
        ) -> Result<()> {
            Err(AppError::Notification("smtp relay unreachable".to_string()))
        }
    }

    fn admin() -> AdminIdentity {
        AdminIdentity {
            id: "ops-1".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    fn user_model(is_active: bool) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            full_name: "Jo Doe".to_string(),
            email: "jo@example.com".to_string(),
            phone: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    fn deposit_model(
        user_id: Uuid,
        amount: Decimal,
        deposit_type: DepositType,
        status: DepositStatus
    ) -> deposit::Model {
        deposit::Model {
            id: Uuid::new_v4(),
            user_id,
            amount,
            currency: "USDT".to_string(),
            network: "TRC20".to_string(),
            deposit_type: deposit_type.as_str().to_string(),
            status: status.as_str().to_string(),
            admin_notes: None,
            tx_hash: None,
            created_at: Utc::now(),
        }
    }

    fn wallet_model(user_id: Uuid, balance: Decimal) -> wallet::Model {
        wallet::Model {
            id: Uuid::new_v4(),
            user_id,
            balance,
            total_deposits: Decimal::ZERO,
            total_withdrawals: Decimal::ZERO,
            updated_at: Utc::now(),
        }
    }

    fn audit_model(deposit_id: Uuid, event: &DepositAuditEvent) -> deposit_audit_event::Model {
        deposit_audit_event::Model {
            id: Uuid::new_v4(),
            deposit_id,
            schema_version: deposit_audit_event::AUDIT_SCHEMA_VERSION,
            event: serde_json::to_value(event).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn entry_model(user_id: Uuid, kind: WalletOperationKind, amount: Decimal, after: Decimal) -> ledger_entry::Model {
        ledger_entry::Model {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            amount,
            memo: "test".to_string(),
            provenance_id: None,
            balance_after: after,
            created_at: Utc::now(),
        }
    }

    fn service(db: sea_orm::DatabaseConnection, notifier: Arc<dyn Notifier>) -> DepositService {
        DepositService::new(
            db.clone(),
            Arc::new(UserRepository::new(db.clone())),
            Arc::new(DepositRepository::new(db)),
            Arc::new(LedgerService::new()),
            notifier
        )
    }

    fn create_input(user_id: Uuid, amount: Decimal) -> CreateManualDepositInput {
        CreateManualDepositInput {
            user_id,
            amount,
            currency: "USDT".to_string(),
            network: "TRC20".to_string(),
            notes: None,
            send_email: true,
        }
    }

    #[tokio::test]
    async fn create_manual_deposit_reports_the_ledger_balance() {
        let user = user_model(true);
        let amount = Decimal::new(10_000, 2); // 100.00
        let deposit = deposit_model(
            user.id,
            amount,
            DepositType::ManualAdmin,
            DepositStatus::Confirmed
        );
        let audit = audit_model(deposit.id, &(DepositAuditEvent::ManualCredit {
            admin_id: "ops-1".to_string(),
            admin_email: "alice@example.com".to_string(),
            at: Utc::now(),
        }));
        let wallet_before = wallet_model(user.id, Decimal::new(5_000, 2));
        let mut wallet_after = wallet_before.clone();
        wallet_after.balance = Decimal::new(15_000, 2);
        wallet_after.total_deposits = amount;
        let entry = entry_model(user.id, WalletOperationKind::Deposit, amount, wallet_after.balance);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![deposit.clone()]])
            .append_query_results([vec![audit]])
            .append_query_results([vec![wallet_before]])
            .append_query_results([vec![wallet_after]])
            .append_query_results([vec![entry]])
            .into_connection();

        let created = service(db, Arc::new(NoopNotifier))
            .create_manual_deposit(&admin(), create_input(user.id, amount)).await
            .unwrap();

        // balance-before + amount, straight from the ledger's return value
        assert_eq!(created.new_balance, Decimal::new(15_000, 2));
        assert_eq!(created.deposit.status, DepositStatus::Confirmed.as_str());
        assert_eq!(created.deposit.deposit_type, DepositType::ManualAdmin.as_str());
        assert_eq!(created.user.id, user.id);
    }

    #[tokio::test]
    async fn create_manual_deposit_survives_notification_failure() {
        let user = user_model(true);
        let amount = Decimal::new(10_000, 2);
        let deposit = deposit_model(
            user.id,
            amount,
            DepositType::ManualAdmin,
            DepositStatus::Confirmed
        );
        let audit = audit_model(deposit.id, &(DepositAuditEvent::ManualCredit {
            admin_id: "ops-1".to_string(),
            admin_email: "alice@example.com".to_string(),
            at: Utc::now(),
        }));
        let wallet_before = wallet_model(user.id, Decimal::ZERO);
        let mut wallet_after = wallet_before.clone();
        wallet_after.balance = amount;
        wallet_after.total_deposits = amount;
        let entry = entry_model(user.id, WalletOperationKind::Deposit, amount, amount);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![deposit]])
            .append_query_results([vec![audit]])
            .append_query_results([vec![wallet_before]])
            .append_query_results([vec![wallet_after]])
            .append_query_results([vec![entry]])
            .into_connection();

        let created = service(db, Arc::new(FailingNotifier))
            .create_manual_deposit(&admin(), create_input(user.id, amount)).await
            .unwrap();

        assert_eq!(created.new_balance, amount);
    }

    #[tokio::test]
    async fn create_manual_deposit_rejects_inactive_user() {
        let user = user_model(false);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();

        let err = service(db, Arc::new(NoopNotifier))
            .create_manual_deposit(&admin(), create_input(user.id, Decimal::ONE)).await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn create_manual_deposit_rejects_unsupported_currency() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mut input = create_input(Uuid::new_v4(), Decimal::ONE);
        input.currency = "DOGE".to_string();

        let err = service(db, Arc::new(NoopNotifier))
            .create_manual_deposit(&admin(), input).await
            .unwrap_err();

        assert!(
            matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "currency")
        );
    }

    #[tokio::test]
    async fn cancel_rejects_already_cancelled_deposit() {
        let deposit = deposit_model(
            Uuid::new_v4(),
            Decimal::new(10_000, 2),
            DepositType::ManualAdmin,
            DepositStatus::Cancelled
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deposit.clone()]])
            .into_connection();

        let err = service(db, Arc::new(NoopNotifier))
            .cancel_manual_deposit(&admin(), deposit.id, "duplicate credit".to_string(), None).await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn cancel_rejects_automatic_deposits() {
        let deposit = deposit_model(
            Uuid::new_v4(),
            Decimal::new(10_000, 2),
            DepositType::Automatic,
            DepositStatus::Confirmed
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deposit.clone()]])
            .into_connection();

        let err = service(db, Arc::new(NoopNotifier))
            .cancel_manual_deposit(&admin(), deposit.id, "wrong record".to_string(), None).await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn cancel_rejects_refund_above_deposit_amount() {
        let deposit = deposit_model(
            Uuid::new_v4(),
            Decimal::new(10_000, 2),
            DepositType::ManualAdmin,
            DepositStatus::Confirmed
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deposit.clone()]])
            .into_connection();

        let err = service(db, Arc::new(NoopNotifier))
            .cancel_manual_deposit(
                &admin(),
                deposit.id,
                "credited in error".to_string(),
                Some(Decimal::new(20_000, 2))
            ).await
            .unwrap_err();

        assert!(
            matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "refund_amount")
        );
    }

    #[tokio::test]
    async fn cancel_with_refund_restores_the_balance() {
        let user = user_model(true);
        let amount = Decimal::new(10_000, 2);
        let deposit = deposit_model(
            user.id,
            amount,
            DepositType::ManualAdmin,
            DepositStatus::Confirmed
        );
        let mut cancelled = deposit.clone();
        cancelled.status = DepositStatus::Cancelled.as_str().to_string();
        let audit = audit_model(deposit.id, &(DepositAuditEvent::Cancelled {
            admin_id: "ops-1".to_string(),
            admin_email: "alice@example.com".to_string(),
            reason: "credited in error".to_string(),
            refund_amount: Some(amount),
            at: Utc::now(),
        }));
        // Balance was 50.00 before the deposit, 150.00 after; the refund
        // brings it back down.
        let wallet_before = wallet_model(user.id, Decimal::new(15_000, 2));
        let mut wallet_after = wallet_before.clone();
        wallet_after.balance = Decimal::new(5_000, 2);
        let entry = entry_model(user.id, WalletOperationKind::Refund, amount, wallet_after.balance);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deposit.clone()]])
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![cancelled.clone()]])
            .append_query_results([vec![audit]])
            .append_query_results([vec![wallet_before]])
            .append_query_results([vec![wallet_after]])
            .append_query_results([vec![entry]])
            .into_connection();

        let result = service(db, Arc::new(NoopNotifier))
            .cancel_manual_deposit(
                &admin(),
                deposit.id,
                "credited in error".to_string(),
                Some(amount)
            ).await
            .unwrap();

        assert_eq!(result.deposit.status, DepositStatus::Cancelled.as_str());
        assert_eq!(result.refunded, Some(amount));
    }
}
