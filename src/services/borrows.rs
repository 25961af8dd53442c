//! Borrow/return/renew service

use chrono::Utc;

use crate::{
    config::BorrowingConfig,
    error::{AppError, AppResult, ErrorCode},
    models::{
        borrow::{
            BorrowRecordQuery, BorrowRecordView, BorrowStatusFilter, RenewRequest, ReturnRequest,
        },
        Page, PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    config: BorrowingConfig,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: BorrowingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow a copy; returns the new borrow record id.
    pub async fn borrow(&self, user_id: i64, book_id: i64) -> AppResult<i64> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::new(
                ErrorCode::BookNotExist,
                format!("book {} not exist", book_id),
            ));
        }

        let open = self.repository.borrows.count_open_for_user(user_id).await?;
        if open >= self.config.max_borrow_num {
            return Err(AppError::new(
                ErrorCode::BorrowNumOver,
                format!(
                    "borrow limit reached ({}/{})",
                    open, self.config.max_borrow_num
                ),
            ));
        }

        self.repository
            .borrows
            .create(user_id, book_id, self.config.loan_period_days)
            .await
    }

    /// Return a copy with the reported outcome.
    pub async fn return_book(&self, user_id: i64, req: &ReturnRequest) -> AppResult<BorrowRecordView> {
        if req.late_fee.is_sign_negative() {
            return Err(AppError::new(ErrorCode::ParamMissing, "late fee must be non-negative"));
        }
        let record = self
            .repository
            .borrows
            .close(user_id, req.book_id, req.borrow_id, req.status, req.late_fee)
            .await?;
        Ok(BorrowRecordView::at(record, Utc::now()))
    }

    /// Extend a loan.
    pub async fn renew(&self, user_id: i64, req: &RenewRequest) -> AppResult<BorrowRecordView> {
        if req.add_days <= 0 {
            return Err(AppError::new(
                ErrorCode::IllegalOperator,
                "extension must be a positive number of days",
            ));
        }
        let record = self
            .repository
            .borrows
            .renew(user_id, req.borrow_id, req.add_days, self.config.max_renewals)
            .await?;
        Ok(BorrowRecordView::at(record, Utc::now()))
    }

    /// A user's borrow records under a status filter.
    pub async fn list(&self, user_id: i64, query: &BorrowRecordQuery) -> AppResult<Page<BorrowRecordView>> {
        let filter = match query.status.as_deref() {
            None => BorrowStatusFilter::All,
            Some(s) => s.parse::<BorrowStatusFilter>().map_err(|_| {
                AppError::new(
                    ErrorCode::IllegalOperator,
                    format!("invalid status filter: {}", s),
                )
            })?,
        };

        let (limit, offset) = PageQuery {
            page_num: query.page_num,
            page_size: query.page_size,
        }
        .limit_offset();

        let (records, total) = self
            .repository
            .borrows
            .list_for_user(user_id, filter, limit, offset)
            .await?;

        let now = Utc::now();
        let items = records
            .into_iter()
            .map(|r| BorrowRecordView::at(r, now))
            .collect();
        Ok(Page { items, total })
    }
}
