//! API handlers for the LMS REST endpoints

pub mod book_types;
pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod reservations;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, ErrorCode},
    models::user::UserClaims,
    AppState,
};

/// Response envelope shared by every endpoint.
///
/// The transport status is always 200; `code == 0` marks success and
/// any other value carries a business error.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: ErrorCode::Success as u32,
            message: "success".to_string(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// Success with no payload.
    pub fn empty() -> Json<Self> {
        Json(Self {
            code: ErrorCode::Success as u32,
            message: "success".to_string(),
            data: None,
        })
    }
}

/// Extractor for the authenticated principal.
///
/// The access token is verified once here; handlers receive the decoded
/// claims explicitly and pass the identity down as a plain parameter.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::new(ErrorCode::AuthInvalid, "missing authorization header")
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::new(ErrorCode::AuthInvalid, "invalid authorization header format")
        })?;

        let claims = state.services.users.verify_access_token(token)?;
        Ok(AuthenticatedUser(claims))
    }
}
