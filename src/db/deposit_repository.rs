use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ self, deposit, deposit_audit_event, Deposit };
use crate::db::entity::deposit_audit_event::{ DepositAuditEvent, AUDIT_SCHEMA_VERSION };
use crate::enums::{ Currency, DepositStatus, DepositType, Network };
use crate::error::{ AppError, Result };

/// Optional filters for the manual-deposit listing.
#[derive(Debug, Default, Clone)]
pub struct ManualDepositFilter {
    pub user_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Raw MANUAL_ADMIN aggregates, grouped rows as (bucket, amount, count).
#[derive(Debug, Clone)]
pub struct ManualDepositAggregates {
    pub total_amount: Decimal,
    pub total_count: u64,
    pub by_currency: Vec<(String, Decimal, u64)>,
    pub by_network: Vec<(String, Decimal, u64)>,
}

pub struct DepositRepository {
    db: DatabaseConnection,
}

impl DepositRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert an admin-credited deposit. Runs on the caller's transaction so
    /// the row commits together with the ledger mutation it justifies.
    pub async fn create_manual<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        amount: Decimal,
        currency: Currency,
        network: Network,
        admin_notes: Option<String>
    ) -> Result<deposit::Model> {
        let model = deposit::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(amount),
            currency: Set(currency.as_str().to_string()),
            network: Set(network.as_str().to_string()),
            deposit_type: Set(DepositType::ManualAdmin.as_str().to_string()),
            status: Set(DepositStatus::Confirmed.as_str().to_string()),
            admin_notes: Set(admin_notes),
            tx_hash: Set(None),
            created_at: Set(chrono::Utc::now()),
        };

        let deposit = model.insert(conn).await?;
        Ok(deposit)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<deposit::Model> {
        Deposit::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("Deposit".to_string()))
    }

    /// Most recent deposits of any type for one user.
    pub async fn recent_for_user(&self, user_id: Uuid, limit: u64) -> Result<Vec<deposit::Model>> {
        let deposits = Deposit::find()
            .filter(deposit::Column::UserId.eq(user_id))
            .order_by_desc(deposit::Column::CreatedAt)
            .limit(limit)
            .all(&self.db).await?;

        Ok(deposits)
    }

    /// MANUAL_ADMIN deposits joined with their owner, newest first. Date
    /// bounds are inclusive whole days.
    pub async fn list_manual(
        &self,
        page: u64,
        limit: u64,
        filter: ManualDepositFilter
    ) -> Result<(Vec<(deposit::Model, Option<entity::user::Model>)>, u64)> {
        let mut query = Deposit::find()
            .find_also_related(entity::user::Entity)
            .filter(deposit::Column::DepositType.eq(DepositType::ManualAdmin.as_str()))
            .order_by_desc(deposit::Column::CreatedAt);

        if let Some(user_id) = filter.user_id {
            query = query.filter(deposit::Column::UserId.eq(user_id));
        }

        if let Some(from) = filter.date_from {
            query = query.filter(
                deposit::Column::CreatedAt.gte(from.and_time(chrono::NaiveTime::MIN).and_utc())
            );
        }

        if let Some(to) = filter.date_to {
            // Inclusive upper bound: strictly before the start of the next day.
            if let Some(next_day) = to.succ_opt() {
                query = query.filter(
                    deposit::Column::CreatedAt.lt(next_day.and_time(chrono::NaiveTime::MIN).and_utc())
                );
            }
        }

        let paginator = query.paginate(&self.db, limit);
        let total_count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok((rows, total_count))
    }

    /// Total amount/count of MANUAL_ADMIN deposits, plus per-currency and
    /// per-network breakdowns.
    pub async fn manual_aggregates(&self) -> Result<ManualDepositAggregates> {
        let manual = deposit::Column::DepositType.eq(DepositType::ManualAdmin.as_str());

        let totals: Option<(Option<Decimal>, i64)> = Deposit::find()
            .select_only()
            .column_as(deposit::Column::Amount.sum(), "total_amount")
            .column_as(deposit::Column::Id.count(), "total_count")
            .filter(manual.clone())
            .into_tuple()
            .one(&self.db).await?;

        let (total_amount, total_count) = totals
            .map(|(amount, count)| (amount.unwrap_or_default(), count as u64))
            .unwrap_or_default();

        let by_currency: Vec<(String, Option<Decimal>, i64)> = Deposit::find()
            .select_only()
            .column(deposit::Column::Currency)
            .column_as(deposit::Column::Amount.sum(), "bucket_amount")
            .column_as(deposit::Column::Id.count(), "bucket_count")
            .filter(manual.clone())
            .group_by(deposit::Column::Currency)
            .into_tuple()
            .all(&self.db).await?;

        let by_network: Vec<(String, Option<Decimal>, i64)> = Deposit::find()
            .select_only()
            .column(deposit::Column::Network)
            .column_as(deposit::Column::Amount.sum(), "bucket_amount")
            .column_as(deposit::Column::Id.count(), "bucket_count")
            .filter(manual)
            .group_by(deposit::Column::Network)
            .into_tuple()
            .all(&self.db).await?;

        let flatten = |rows: Vec<(String, Option<Decimal>, i64)>| {
            rows.into_iter()
                .map(|(bucket, amount, count)| (bucket, amount.unwrap_or_default(), count as u64))
                .collect()
        };

        Ok(ManualDepositAggregates {
            total_amount,
            total_count,
            by_currency: flatten(by_currency),
            by_network: flatten(by_network),
        })
    }

    /// Flip a deposit to CANCELLED. Runs on the caller's transaction.
    pub async fn set_cancelled<C: ConnectionTrait>(
        &self,
        conn: &C,
        deposit: deposit::Model
    ) -> Result<deposit::Model> {
        let mut model: deposit::ActiveModel = deposit.into();
        model.status = Set(DepositStatus::Cancelled.as_str().to_string());

        let updated = model.update(conn).await?;
        Ok(updated)
    }

    /// Append a structured audit event for a deposit. Runs on the caller's
    /// transaction so the trail commits with the change it describes.
    pub async fn append_audit_event<C: ConnectionTrait>(
        &self,
        conn: &C,
        deposit_id: Uuid,
        event: &DepositAuditEvent
    ) -> Result<deposit_audit_event::Model> {
        let payload = serde_json::to_value(event).map_err(|e| {
            AppError::Internal(format!("failed to encode audit event: {}", e))
        })?;

        let model = deposit_audit_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            deposit_id: Set(deposit_id),
            schema_version: Set(AUDIT_SCHEMA_VERSION),
            event: Set(payload),
            created_at: Set(chrono::Utc::now()),
        };

        let event = model.insert(conn).await?;
        Ok(event)
    }
}
