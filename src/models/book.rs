//! Physical copy (book) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Lifecycle status of one physical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Available,
    CheckedOut,
    Lost,
    Damaged,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::CheckedOut => "checked_out",
            BookStatus::Lost => "lost",
            BookStatus::Damaged => "damaged",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BookStatus::Available),
            "checked_out" => Ok(BookStatus::CheckedOut),
            "lost" => Ok(BookStatus::Lost),
            "damaged" => Ok(BookStatus::Damaged),
            _ => Err(format!("invalid book status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// One physical, individually trackable copy of a catalog entry.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    /// Owning catalog entry; validated in application logic, not a FK.
    pub isbn: String,
    pub location: String,
    pub status: BookStatus,
    pub purchase_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub purchase_price: Decimal,
    pub last_checkout: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBookRequest {
    pub isbn: String,
    pub location: String,
    #[serde(default = "default_status")]
    pub status: BookStatus,
    pub purchase_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub purchase_price: Decimal,
}

fn default_status() -> BookStatus {
    BookStatus::Available
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub location: Option<String>,
    pub status: Option<BookStatus>,
    pub purchase_date: Option<DateTime<Utc>>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
}

impl UpdateBookRequest {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.status.is_none()
            && self.purchase_date.is_none()
            && self.purchase_price.is_none()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BookQuery {
    pub isbn: Option<String>,
    pub book_id: Option<i64>,
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
}
