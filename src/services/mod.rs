//! Domain operations. Functions that touch more than one row take
//! `&mut Connection` and do their work inside a single transaction.

pub mod admin;
pub mod comments;
pub mod files;
pub mod follows;
pub mod media;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod users;

pub const MAX_PAGE_SIZE: i64 = 100;

/// LIMIT/OFFSET window for a page request. `first_page` is the number the
/// client uses for the first page (posts count from 1, notifications from 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Window {
    pub fn new(page: i64, size: i64, first_page: i64) -> Self {
        let page = page.max(first_page);
        let limit = size.clamp(1, MAX_PAGE_SIZE);
        Self {
            page,
            limit,
            offset: page.saturating_sub(first_page).saturating_mul(limit),
        }
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}
