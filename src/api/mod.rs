use std::sync::Arc;

pub mod users;
pub mod deposits;

use serde::Serialize;

use crate::auth::AdminRegistry;
use crate::error::{ AppError, Result };
use crate::services::{ DepositService, UserService };

pub const DEFAULT_USERS_PAGE_SIZE: u64 = 50;
pub const DEFAULT_DEPOSITS_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub deposit_service: Arc<DepositService>,
    pub auth: Arc<AdminRegistry>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        deposit_service: Arc<DepositService>,
        auth: Arc<AdminRegistry>
    ) -> Self {
        Self {
            user_service,
            deposit_service,
            auth,
        }
    }
}

/// Page metadata shared by every listing endpoint.
#[derive(Debug, PartialEq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(limit);

        Self {
            page,
            limit,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Resolve the shared page/limit query contract: page >= 1, limit in [1,100].
pub fn resolve_pagination(
    page: Option<u64>,
    limit: Option<u64>,
    default_limit: u64
) -> Result<(u64, u64)> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::validation_field("page", "Page must be at least 1"));
    }

    let limit = limit.unwrap_or(default_limit);
    if limit < 1 || limit > MAX_PAGE_SIZE {
        return Err(
            AppError::validation_field(
                "limit",
                format!("Limit must be between 1 and {}", MAX_PAGE_SIZE)
            )
        );
    }

    Ok((page, limit))
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: None,
            data,
            pagination: Some(pagination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let pagination = Pagination::new(1, 20, 45);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn last_page_has_no_next() {
        let pagination = Pagination::new(3, 20, 45);
        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }

    #[test]
    fn exact_multiple_of_limit() {
        let pagination = Pagination::new(2, 10, 40);
        assert_eq!(pagination.total_pages, 4);
        assert!(pagination.has_next);
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        let pagination = Pagination::new(1, 20, 0);
        assert_eq!(pagination.total_pages, 0);
        assert!(!pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn resolve_pagination_applies_defaults() {
        assert_eq!(resolve_pagination(None, None, 50).unwrap(), (1, 50));
        assert_eq!(resolve_pagination(Some(3), Some(25), 50).unwrap(), (3, 25));
    }

    #[test]
    fn resolve_pagination_rejects_out_of_range_values() {
        assert!(resolve_pagination(Some(0), None, 50).is_err());
        assert!(resolve_pagination(None, Some(0), 50).is_err());
        assert!(resolve_pagination(None, Some(101), 50).is_err());
    }
}
