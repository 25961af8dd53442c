//! Domain models and request/response types

pub mod book;
pub mod book_type;
pub mod borrow;
pub mod reservation;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Common pagination parameters (1-based page number).
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// Resolve to a (limit, offset) pair, clamping nonsense input.
    pub fn limit_offset(&self) -> (i64, i64) {
        let page_num = self.page_num.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(20).clamp(1, 100);
        (page_size, (page_num - 1) * page_size)
    }
}

/// A page of results plus the total count under the same filter.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamping() {
        let q = PageQuery {
            page_num: None,
            page_size: None,
        };
        assert_eq!(q.limit_offset(), (20, 0));

        let q = PageQuery {
            page_num: Some(3),
            page_size: Some(10),
        };
        assert_eq!(q.limit_offset(), (10, 20));

        let q = PageQuery {
            page_num: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(q.limit_offset(), (100, 0));
    }
}
