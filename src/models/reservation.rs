//! Reservation ledger model.
//!
//! Passive record store: nothing ever transitions a pending reservation
//! to fulfilled when a copy frees up, and stale reservations are not
//! expired. Known-incomplete; see DESIGN.md.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Fulfilled,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "fulfilled" => Ok(ReservationStatus::Fulfilled),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "expired" => Ok(ReservationStatus::Expired),
            _ => Err(format!("invalid reservation status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for ReservationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ReservationStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ReservationStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub isbn: String,
    pub reserve_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveRequest {
    pub book_id: i64,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationQuery {
    pub page_num: Option<i64>,
    pub page_size: Option<i64>,
}
