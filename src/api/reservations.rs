//! Reservation ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        reservation::{Reservation, ReservationQuery, ReserveRequest},
        Page,
    },
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

/// Place a reservation on a copy
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = ReserveRequest,
    responses((status = 200, description = "Envelope with the pending reservation"))
)]
pub async fn reserve(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(req): Json<ReserveRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let reservation = state
        .services
        .reservations
        .reserve(claims.user_id, &req)
        .await?;
    Ok(ApiResponse::ok(reservation))
}

/// Cancel one of the caller's pending reservations
#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Reservation id")),
    responses((status = 200, description = "Envelope with the cancelled reservation"))
)]
pub async fn cancel(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let reservation = state.services.reservations.cancel(claims.user_id, id).await?;
    Ok(ApiResponse::ok(reservation))
}

/// The caller's reservations, newest first
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses((status = 200, description = "Envelope with a page of reservations"))
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ApiResponse<Page<Reservation>>>> {
    let page = state
        .services
        .reservations
        .list(claims.user_id, &query)
        .await?;
    Ok(ApiResponse::ok(page))
}
