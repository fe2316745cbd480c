//! Back-office read models.

use serde::{Deserialize, Serialize};

/// Dashboard counters.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub users: i64,
    pub listings: i64,
    pub bookings: i64,
    pub messages: i64,
    /// Sum of all booking totals, minor currency units
    pub revenue: i64,
}

/// `?limit=&offset=` on admin list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: i64 = 50;

    /// `(limit, offset)` with the limit clamped to `max` and negative offsets zeroed.
    pub fn resolve(&self, max: i64) -> (i64, i64) {
        (
            crate::validation::page_limit(self.limit, Self::DEFAULT_LIMIT, max),
            self.offset.unwrap_or(0).max(0),
        )
    }
}
