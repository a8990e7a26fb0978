pub mod auth;
pub mod chat;
pub mod food_item;
pub mod notification;
pub mod order;
pub mod store;
pub mod surprise_bag;
pub mod transaction;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard paginated envelope: `{"data": [...], "count", "skip", "limit"}`.
#[derive(Serialize)]
pub struct PaginationResponse<T> {
    pub data: Vec<T>,
    pub count: i64,
    pub skip: i64,
    pub limit: i64,
}

impl<T> PaginationResponse<T> {
    pub fn new(data: Vec<T>, skip: i64, limit: i64) -> Self {
        let count = data.len() as i64;
        Self {
            data,
            count,
            skip,
            limit,
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_clamps_bounds() {
        let q = PageQuery {
            skip: Some(-5),
            limit: Some(1000),
        };
        assert_eq!(q.skip(), 0);
        assert_eq!(q.limit(), 100);

        let q = PageQuery {
            skip: None,
            limit: None,
        };
        assert_eq!(q.skip(), 0);
        assert_eq!(q.limit(), 20);
    }
}
