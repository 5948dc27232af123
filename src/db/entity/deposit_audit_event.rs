use chrono::{ DateTime, Utc };
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Version of the `DepositAuditEvent` wire shape stored in the `event` column.
pub const AUDIT_SCHEMA_VERSION: i16 = 1;

/// Append-only audit trail entry for a deposit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposit_audit_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub deposit_id: Uuid,
    pub schema_version: i16,
    pub event: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deposit::Entity",
        from = "Column::DepositId",
        to = "super::deposit::Column::Id"
    )]
    Deposit,
}

impl Related<super::deposit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// What happened to a deposit, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepositAuditEvent {
    ManualCredit {
        admin_id: String,
        admin_email: String,
        at: DateTime<Utc>,
    },
    Cancelled {
        admin_id: String,
        admin_email: String,
        reason: String,
        refund_amount: Option<Decimal>,
        at: DateTime<Utc>,
    },
}
