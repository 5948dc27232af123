use std::sync::Arc;
use uuid::Uuid;

use crate::db::entity::{ deposit, ledger_entry, user, wallet };
use crate::db::{ DepositRepository, LedgerEntryRepository, UserRepository };
use crate::error::{ AppError, Result };

/// Longest accepted search term for the user listing.
pub const MAX_SEARCH_LEN: usize = 100;

/// How many recent deposits the user detail view carries.
pub const RECENT_DEPOSITS_LIMIT: u64 = 10;

pub struct UserDetail {
    pub user: user::Model,
    pub wallet: wallet::Model,
    pub recent_deposits: Vec<deposit::Model>,
}

pub struct UserService {
    user_repo: Arc<UserRepository>,
    deposit_repo: Arc<DepositRepository>,
    ledger_entry_repo: Arc<LedgerEntryRepository>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        deposit_repo: Arc<DepositRepository>,
        ledger_entry_repo: Arc<LedgerEntryRepository>
    ) -> Self {
        Self {
            user_repo,
            deposit_repo,
            ledger_entry_repo,
        }
    }

    pub async fn list_users(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>
    ) -> Result<(Vec<(user::Model, wallet::Model)>, u64)> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(term) = &search {
            if term.chars().count() > MAX_SEARCH_LEN {
                return Err(
                    AppError::validation_field(
                        "search",
                        format!("Search term cannot exceed {} characters", MAX_SEARCH_LEN)
                    )
                );
            }
        }

        self.user_repo.list_active(page, limit, search.as_deref()).await
    }

    pub async fn get_user_detail(&self, user_id: Uuid) -> Result<UserDetail> {
        let (user, wallet) = self.user_repo.find_with_wallet(user_id).await?;
        let recent_deposits = self.deposit_repo.recent_for_user(
            user_id,
            RECENT_DEPOSITS_LIMIT
        ).await?;

        Ok(UserDetail {
            user,
            wallet,
            recent_deposits,
        })
    }

    pub async fn list_user_ledger(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64
    ) -> Result<(Vec<ledger_entry::Model>, u64)> {
        // Verify the user exists
        self.user_repo.find_by_id(user_id).await?;

        self.ledger_entry_repo.find_by_user_id(user_id, page, limit).await
    }
}
