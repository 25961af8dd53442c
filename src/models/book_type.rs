//! Catalog aggregate (book type) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Catalog entry shared by all physical copies of a title.
///
/// Counter invariant: `0 <= available_copies <= total_copies`. Both are
/// mutated only as a side effect of copy add/delete and borrow/return.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookType {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publisher: String,
    pub publish_year: i64,
    pub description: String,
    pub total_copies: i64,
    pub available_copies: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddBookTypeRequest {
    pub isbn: String,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub author: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 50))]
    pub publisher: String,
    pub publish_year: i64,
    #[serde(default)]
    pub description: String,
}

/// Partial update; counters are not patchable through this path.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookTypeRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub publish_year: Option<i64>,
    pub description: Option<String>,
}

impl UpdateBookTypeRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.publisher.is_none()
            && self.publish_year.is_none()
            && self.description.is_none()
    }
}

/// Search filters; substring match on title/author/category, exact on ISBN.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BookTypeQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
}
