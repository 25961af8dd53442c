//! Copy registry service

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::{AddBookRequest, Book, BookQuery, UpdateBookRequest},
        Page, PageQuery,
    },
    repository::Repository,
    services::validation,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a copy. Whether the catalog entry exists is decided by
    /// the counter update inside the repository transaction, not by a
    /// separate read that could race.
    pub async fn add(&self, req: &AddBookRequest) -> AppResult<Book> {
        if !validation::is_valid_isbn(&req.isbn) {
            return Err(AppError::new(ErrorCode::InvalidIsbn, "invalid ISBN format"));
        }
        self.repository.books.create(req).await
    }

    pub async fn update(&self, id: i64, req: &UpdateBookRequest) -> AppResult<Book> {
        if req.is_empty() {
            return Err(AppError::new(ErrorCode::ParamMissing, "no fields to update"));
        }
        self.repository.books.update(id, req).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    pub async fn search(&self, query: &BookQuery) -> AppResult<Page<Book>> {
        let (limit, offset) = PageQuery {
            page_num: query.page_num,
            page_size: query.page_size,
        }
        .limit_offset();
        let (items, total) = self.repository.books.search(query, limit, offset).await?;
        Ok(Page { items, total })
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }
}
