//! Reservation ledger service.
//!
//! Records reservations only; nothing here (or anywhere) fulfills a
//! pending reservation when a copy frees up.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        reservation::{Reservation, ReservationQuery, ReserveRequest},
        Page, PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn reserve(&self, user_id: i64, req: &ReserveRequest) -> AppResult<Reservation> {
        if req.expiry_date <= Utc::now() {
            return Err(AppError::new(
                ErrorCode::ReserveDateError,
                "expiry date must be in the future",
            ));
        }

        // The copy must exist; its ISBN is denormalized onto the ledger.
        let book = self.repository.books.get_by_id(req.book_id).await?;
        self.repository
            .reservations
            .create(user_id, book.id, &book.isbn, req.expiry_date)
            .await
    }

    pub async fn cancel(&self, user_id: i64, reservation_id: i64) -> AppResult<Reservation> {
        self.repository.reservations.cancel(user_id, reservation_id).await
    }

    pub async fn list(&self, user_id: i64, query: &ReservationQuery) -> AppResult<Page<Reservation>> {
        let (limit, offset) = PageQuery {
            page_num: query.page_num,
            page_size: query.page_size,
        }
        .limit_offset();
        let (items, total) = self
            .repository
            .reservations
            .list_for_user(user_id, limit, offset)
            .await?;
        Ok(Page { items, total })
    }
}
