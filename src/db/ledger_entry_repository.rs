use sea_orm::{
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::entity::{ ledger_entry, LedgerEntry };
use crate::error::Result;

pub struct LedgerEntryRepository {
    db: DatabaseConnection,
}

impl LedgerEntryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// A user's ledger history, newest first.
    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64
    ) -> Result<(Vec<ledger_entry::Model>, u64)> {
        let paginator = LedgerEntry::find()
            .filter(ledger_entry::Column::UserId.eq(user_id))
            .order_by_desc(ledger_entry::Column::CreatedAt)
            .paginate(&self.db, limit);

        let total_count = paginator.num_items().await?;
        let entries = paginator.fetch_page(page - 1).await?;

        Ok((entries, total_count))
    }
}
