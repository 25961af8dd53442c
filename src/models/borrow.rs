//! Borrow record model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Status of a borrow record. `Returned` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    CheckedOut,
    Returned,
    Overdue,
    Lost,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::CheckedOut => "checked_out",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
            BorrowStatus::Lost => "lost",
        }
    }

    /// Terminal records reject all further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BorrowStatus::Returned | BorrowStatus::Lost)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked_out" => Ok(BorrowStatus::CheckedOut),
            "returned" => Ok(BorrowStatus::Returned),
            "overdue" => Ok(BorrowStatus::Overdue),
            "lost" => Ok(BorrowStatus::Lost),
            _ => Err(format!("invalid borrow status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Outcome reported when a copy comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReturnOutcome {
    Returned,
    Lost,
    Damaged,
}

impl ReturnOutcome {
    /// The record status the outcome closes the ledger entry with. A
    /// damaged copy still ends its loan as returned; the copy's own
    /// status carries the damage.
    pub fn record_status(&self) -> BorrowStatus {
        match self {
            ReturnOutcome::Returned | ReturnOutcome::Damaged => BorrowStatus::Returned,
            ReturnOutcome::Lost => BorrowStatus::Lost,
        }
    }
}

/// Status filter for listing borrow records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowStatusFilter {
    One(BorrowStatus),
    All,
}

impl std::str::FromStr for BorrowStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(BorrowStatusFilter::All);
        }
        s.parse::<BorrowStatus>().map(BorrowStatusFilter::One)
    }
}

/// Ledger entry for one loan of one copy to one user. Never deleted.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub checkout_date: DateTime<Utc>,
    pub renewal_count: i64,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    #[schema(value_type = f64)]
    pub late_fee: Decimal,
}

impl BorrowRecord {
    /// An open record past its due date. No sweep flips the stored
    /// status; overdue is surfaced lazily at read time.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BorrowStatus::CheckedOut && self.due_date < now
    }
}

/// Borrow record plus the lazily computed overdue flag.
#[derive(Debug, Serialize, ToSchema)]
pub struct BorrowRecordView {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub is_overdue: bool,
}

impl BorrowRecordView {
    pub fn at(record: BorrowRecord, now: DateTime<Utc>) -> Self {
        let is_overdue = record.is_overdue(now);
        Self { record, is_overdue }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub book_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub book_id: i64,
    pub borrow_id: i64,
    pub status: ReturnOutcome,
    #[schema(value_type = f64)]
    pub late_fee: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewRequest {
    pub borrow_id: i64,
    /// Days added to the current due date.
    pub add_days: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BorrowRecordQuery {
    /// One of checked_out, returned, overdue, lost, all.
    pub status: Option<String>,
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    #[test]
    fn terminal_statuses() {
        assert!(BorrowStatus::Returned.is_terminal());
        assert!(BorrowStatus::Lost.is_terminal());
        assert!(!BorrowStatus::CheckedOut.is_terminal());
        assert!(!BorrowStatus::Overdue.is_terminal());
    }

    #[test]
    fn filter_parsing() {
        assert_eq!("all".parse::<BorrowStatusFilter>().unwrap(), BorrowStatusFilter::All);
        assert_eq!(
            "checked_out".parse::<BorrowStatusFilter>().unwrap(),
            BorrowStatusFilter::One(BorrowStatus::CheckedOut)
        );
        assert!("borrowed".parse::<BorrowStatusFilter>().is_err());
    }

    #[test]
    fn outcome_maps_to_record_status() {
        assert_eq!(ReturnOutcome::Returned.record_status(), BorrowStatus::Returned);
        assert_eq!(ReturnOutcome::Damaged.record_status(), BorrowStatus::Returned);
        assert_eq!(ReturnOutcome::Lost.record_status(), BorrowStatus::Lost);
    }

    fn record(status: BorrowStatus, due_in: Duration) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id: 1,
            user_id: 42,
            book_id: 7,
            checkout_date: now,
            renewal_count: 0,
            due_date: now + due_in,
            return_date: None,
            status,
            late_fee: Decimal::ZERO,
        }
    }

    #[test]
    fn overdue_is_computed_lazily() {
        let now = Utc::now();
        assert!(record(BorrowStatus::CheckedOut, Duration::days(-1)).is_overdue(now));
        assert!(!record(BorrowStatus::CheckedOut, Duration::days(1)).is_overdue(now));
        // closed records are never reported overdue
        assert!(!record(BorrowStatus::Returned, Duration::days(-1)).is_overdue(now));
    }
}
