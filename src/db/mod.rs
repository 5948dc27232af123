use sea_orm::{
    entity::prelude::*,
    sea_query::{ Expr, extension::postgres::PgExpr },
    Condition,
    DatabaseConnection,
    PaginatorTrait,
    QueryOrder,
};
use uuid::Uuid;

use crate::error::{ AppError, Result };

pub mod entity;
pub use entity::*;

mod deposit_repository;
pub use deposit_repository::{ DepositRepository, ManualDepositFilter };

mod ledger_entry_repository;
pub use ledger_entry_repository::LedgerEntryRepository;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<entity::user::Model> {
        entity::user::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Fetch a user together with their wallet. Every user owns exactly one
    /// wallet; a missing wallet row is data corruption, not a 404.
    pub async fn find_with_wallet(
        &self,
        id: Uuid
    ) -> Result<(entity::user::Model, entity::wallet::Model)> {
        let (user, wallet) = entity::user::Entity
            ::find_by_id(id)
            .find_also_related(entity::wallet::Entity)
            .one(&self.db).await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let wallet = wallet.ok_or_else(|| {
            AppError::Internal(format!("wallet record missing for user {}", user.id))
        })?;

        Ok((user, wallet))
    }

    /// Active users with their wallets, newest first, optionally filtered by a
    /// case-insensitive substring match on name, email or phone.
    pub async fn list_active(
        &self,
        page: u64,
        limit: u64,
        search: Option<&str>
    ) -> Result<(Vec<(entity::user::Model, entity::wallet::Model)>, u64)> {
        let mut query = entity::user::Entity
            ::find()
            .find_also_related(entity::wallet::Entity)
            .filter(entity::user::Column::IsActive.eq(true))
            .order_by_desc(entity::user::Column::CreatedAt);

        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((entity::user::Entity, entity::user::Column::FullName)).ilike(
                            pattern.clone()
                        )
                    )
                    .add(
                        Expr::col((entity::user::Entity, entity::user::Column::Email)).ilike(
                            pattern.clone()
                        )
                    )
                    .add(
                        Expr::col((entity::user::Entity, entity::user::Column::Phone)).ilike(pattern)
                    )
            );
        }

        let paginator = query.paginate(&self.db, limit);
        let total_count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let mut users = Vec::with_capacity(rows.len());
        for (user, wallet) in rows {
            let wallet = wallet.ok_or_else(|| {
                AppError::Internal(format!("wallet record missing for user {}", user.id))
            })?;
            users.push((user, wallet));
        }

        Ok((users, total_count))
    }
}
