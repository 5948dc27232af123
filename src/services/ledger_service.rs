use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ ledger_entry, wallet, Wallet };
use crate::enums::WalletOperationKind;
use crate::error::{ AppError, Result };

/// Applies balance-affecting operations to a wallet and records provenance.
///
/// Every mutation runs on the caller's connection; callers that create a
/// justifying record (deposit creation, cancellation refund) pass their open
/// transaction so both writes commit or roll back together. The wallet row
/// is locked (`SELECT ... FOR UPDATE`) for the duration of the
/// read-modify-write, which serializes concurrent operations on the same
/// wallet.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Apply one wallet operation and return the updated wallet. The returned
    /// snapshot is the single source of truth for the post-operation balance;
    /// callers must not recompute it from an earlier read.
    pub async fn apply_wallet_operation<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        amount: Decimal,
        kind: WalletOperationKind,
        memo: &str,
        provenance_id: Option<Uuid>
    ) -> Result<wallet::Model> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation_field("amount", "Amount must be positive"));
        }

        let wallet = Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(conn).await?
            .ok_or_else(|| AppError::NotFound("Wallet".to_string()))?;

        let new_balance = wallet.balance + kind.signed_delta(amount);
        if new_balance < Decimal::ZERO {
            return Err(AppError::InvalidState("Insufficient balance".to_string()));
        }

        let mut model: wallet::ActiveModel = wallet.clone().into();
        model.balance = Set(new_balance);
        match kind {
            WalletOperationKind::Deposit => {
                model.total_deposits = Set(wallet.total_deposits + amount);
            }
            WalletOperationKind::Withdrawal => {
                model.total_withdrawals = Set(wallet.total_withdrawals + amount);
            }
            // REFUND reverses a prior credit without touching the aggregates.
            WalletOperationKind::Refund => {}
        }
        model.updated_at = Set(chrono::Utc::now());

        let updated = model.update(conn).await?;

        let entry = ledger_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            kind: Set(kind.as_str().to_string()),
            amount: Set(amount),
            memo: Set(memo.to_string()),
            provenance_id: Set(provenance_id),
            balance_after: Set(updated.balance),
            created_at: Set(chrono::Utc::now()),
        };
        entry.insert(conn).await?;

        Ok(updated)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{ DatabaseBackend, DatabaseConnection, MockDatabase };

    use super::*;

    fn wallet_model(user_id: Uuid, balance: i64, deposits: i64, withdrawals: i64) -> wallet::Model {
        wallet::Model {
            id: Uuid::new_v4(),
            user_id,
            balance: Decimal::new(balance, 2),
            total_deposits: Decimal::new(deposits, 2),
            total_withdrawals: Decimal::new(withdrawals, 2),
            updated_at: Utc::now(),
        }
    }

    fn entry_model(user_id: Uuid, kind: WalletOperationKind, amount: i64, after: i64) -> ledger_entry::Model {
        ledger_entry::Model {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            amount: Decimal::new(amount, 2),
            memo: "test".to_string(),
            provenance_id: None,
            balance_after: Decimal::new(after, 2),
            created_at: Utc::now(),
        }
    }

    fn mock_db(results: Vec<Vec<wallet::Model>>, entry: ledger_entry::Model) -> DatabaseConnection {
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres);
        for rows in results {
            mock = mock.append_query_results([rows]);
        }
        mock.append_query_results([vec![entry]]).into_connection()
    }

    #[tokio::test]
    async fn deposit_credits_balance_and_total_deposits() {
        let user_id = Uuid::new_v4();
        let before = wallet_model(user_id, 5_000, 20_000, 15_000);
        let mut after = before.clone();
        after.balance = Decimal::new(15_000, 2);
        after.total_deposits = Decimal::new(30_000, 2);

        let db = mock_db(
            vec![vec![before], vec![after.clone()]],
            entry_model(user_id, WalletOperationKind::Deposit, 10_000, 15_000)
        );

        let updated = LedgerService::new()
            .apply_wallet_operation(
                &db,
                user_id,
                Decimal::new(10_000, 2),
                WalletOperationKind::Deposit,
                "manual deposit",
                None
            ).await
            .unwrap();

        assert_eq!(updated.balance, Decimal::new(15_000, 2));
        assert_eq!(updated.total_deposits, Decimal::new(30_000, 2));
        assert_eq!(updated.total_withdrawals, Decimal::new(15_000, 2));
    }

    #[tokio::test]
    async fn refund_reverses_credit_without_touching_aggregates() {
        let user_id = Uuid::new_v4();
        let before = wallet_model(user_id, 15_000, 30_000, 15_000);
        let mut after = before.clone();
        after.balance = Decimal::new(5_000, 2);

        let db = mock_db(
            vec![vec![before], vec![after.clone()]],
            entry_model(user_id, WalletOperationKind::Refund, 10_000, 5_000)
        );

        let updated = LedgerService::new()
            .apply_wallet_operation(
                &db,
                user_id,
                Decimal::new(10_000, 2),
                WalletOperationKind::Refund,
                "refund for cancelled deposit",
                None
            ).await
            .unwrap();

        assert_eq!(updated.balance, Decimal::new(5_000, 2));
        assert_eq!(updated.total_deposits, Decimal::new(30_000, 2));
        assert_eq!(updated.total_withdrawals, Decimal::new(15_000, 2));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = LedgerService::new()
            .apply_wallet_operation(
                &db,
                Uuid::new_v4(),
                Decimal::ZERO,
                WalletOperationKind::Deposit,
                "noop",
                None
            ).await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn withdrawal_cannot_overdraw_the_wallet() {
        let user_id = Uuid::new_v4();
        let before = wallet_model(user_id, 3_000, 10_000, 7_000);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![before]])
            .into_connection();

        let err = LedgerService::new()
            .apply_wallet_operation(
                &db,
                user_id,
                Decimal::new(10_000, 2),
                WalletOperationKind::Withdrawal,
                "withdrawal",
                None
            ).await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
