use axum::{ extract::{ Path, Query, State }, Json };
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::entity::{ deposit, user };
use crate::db::ManualDepositFilter;
use crate::error::Result;
use crate::services::deposit_service::{ CreateManualDepositInput, ManualDepositStats };

use super::{ resolve_pagination, ApiResponse, AppState, Pagination, DEFAULT_DEPOSITS_PAGE_SIZE };

#[derive(Deserialize)]
pub struct CreateManualDepositRequest {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub network: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub send_email: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListManualDepositsParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub user_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CancelManualDepositRequest {
    pub reason: String,
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
}

#[derive(Serialize)]
pub struct DepositResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub network: String,
    pub deposit_type: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: String,
}

impl From<deposit::Model> for DepositResponse {
    fn from(deposit: deposit::Model) -> Self {
        Self {
            id: deposit.id,
            user_id: deposit.user_id,
            amount: deposit.amount,
            currency: deposit.currency,
            network: deposit.network,
            deposit_type: deposit.deposit_type,
            status: deposit.status,
            admin_notes: deposit.admin_notes,
            tx_hash: deposit.tx_hash,
            created_at: deposit.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct DepositOwner {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

impl From<user::Model> for DepositOwner {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
        }
    }
}

#[derive(Serialize)]
pub struct ManualDepositListItem {
    #[serde(flatten)]
    pub deposit: DepositResponse,
    pub user: Option<DepositOwner>,
}

#[derive(Serialize)]
pub struct CreatedDepositUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub new_balance: Decimal,
}

#[derive(Serialize)]
pub struct CreatedDepositData {
    pub deposit: DepositResponse,
    pub user: CreatedDepositUser,
}

pub async fn create_manual_deposit(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<CreateManualDepositRequest>
) -> Result<Json<ApiResponse<CreatedDepositData>>> {
    let created = state.deposit_service.create_manual_deposit(&admin, CreateManualDepositInput {
        user_id: request.user_id,
        amount: request.amount,
        currency: request.currency,
        network: request.network,
        notes: request.notes,
        send_email: request.send_email.unwrap_or(true),
    }).await?;

    let data = CreatedDepositData {
        deposit: created.deposit.into(),
        user: CreatedDepositUser {
            id: created.user.id,
            full_name: created.user.full_name,
            email: created.user.email,
            new_balance: created.new_balance,
        },
    };

    Ok(Json(ApiResponse::with_message("Manual deposit created successfully", data)))
}

pub async fn list_manual_deposits(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Query(params): Query<ListManualDepositsParams>
) -> Result<Json<ApiResponse<Vec<ManualDepositListItem>>>> {
    let (page, limit) = resolve_pagination(params.page, params.limit, DEFAULT_DEPOSITS_PAGE_SIZE)?;

    let (rows, total_count) = state.deposit_service.list_manual_deposits(
        page,
        limit,
        ManualDepositFilter {
            user_id: params.user_id,
            date_from: params.date_from,
            date_to: params.date_to,
        }
    ).await?;

    let data = rows
        .into_iter()
        .map(|(deposit, user)| ManualDepositListItem {
            deposit: deposit.into(),
            user: user.map(DepositOwner::from),
        })
        .collect();

    Ok(Json(ApiResponse::paginated(data, Pagination::new(page, limit, total_count))))
}

pub async fn get_manual_deposit_stats(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth
) -> Result<Json<ApiResponse<ManualDepositStats>>> {
    let stats = state.deposit_service.get_manual_deposit_stats().await?;

    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn cancel_manual_deposit(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Path(deposit_id): Path<Uuid>,
    Json(request): Json<CancelManualDepositRequest>
) -> Result<Json<ApiResponse<DepositResponse>>> {
    let cancelled = state.deposit_service.cancel_manual_deposit(
        &admin,
        deposit_id,
        request.reason,
        request.refund_amount
    ).await?;

    Ok(Json(ApiResponse::with_message("Deposit cancelled successfully", cancelled.deposit.into())))
}
