use axum::{ extract::{ Path, Query, State }, Json };
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::entity::{ ledger_entry, user, wallet };
use crate::error::Result;

use super::deposits::DepositResponse;
use super::{
    resolve_pagination,
    ApiResponse,
    AppState,
    Pagination,
    DEFAULT_DEPOSITS_PAGE_SIZE,
    DEFAULT_USERS_PAGE_SIZE,
};

#[derive(Deserialize)]
pub struct ListUsersParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct LedgerQueryParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct WalletSummary {
    pub balance: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
}

impl From<wallet::Model> for WalletSummary {
    fn from(wallet: wallet::Model) -> Self {
        Self {
            balance: wallet.balance,
            total_deposits: wallet.total_deposits,
            total_withdrawals: wallet.total_withdrawals,
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub wallet: WalletSummary,
}

impl UserResponse {
    fn from_models(user: user::Model, wallet: wallet::Model) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            wallet: wallet.into(),
        }
    }
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recent_deposits: Vec<DepositResponse>,
}

#[derive(Serialize)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub memo: String,
    pub provenance_id: Option<Uuid>,
    pub balance_after: Decimal,
    pub created_at: String,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(entry: ledger_entry::Model) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            amount: entry.amount,
            memo: entry.memo,
            provenance_id: entry.provenance_id,
            balance_after: entry.balance_after,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Query(params): Query<ListUsersParams>
) -> Result<Json<ApiResponse<Vec<UserResponse>>>> {
    let (page, limit) = resolve_pagination(params.page, params.limit, DEFAULT_USERS_PAGE_SIZE)?;

    let (rows, total_count) = state.user_service.list_users(page, limit, params.search).await?;

    let data = rows
        .into_iter()
        .map(|(user, wallet)| UserResponse::from_models(user, wallet))
        .collect();

    Ok(Json(ApiResponse::paginated(data, Pagination::new(page, limit, total_count))))
}

pub async fn get_user_detail(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(user_id): Path<Uuid>
) -> Result<Json<ApiResponse<UserDetailResponse>>> {
    let detail = state.user_service.get_user_detail(user_id).await?;

    let response = UserDetailResponse {
        user: UserResponse::from_models(detail.user, detail.wallet),
        recent_deposits: detail.recent_deposits.into_iter().map(Into::into).collect(),
    };

    Ok(Json(ApiResponse::ok(response)))
}

pub async fn get_user_ledger(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(user_id): Path<Uuid>,
    Query(params): Query<LedgerQueryParams>
) -> Result<Json<ApiResponse<Vec<LedgerEntryResponse>>>> {
    let (page, limit) = resolve_pagination(params.page, params.limit, DEFAULT_DEPOSITS_PAGE_SIZE)?;

    let (entries, total_count) = state.user_service.list_user_ledger(user_id, page, limit).await?;

    let data = entries.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::paginated(data, Pagination::new(page, limit, total_count))))
}
