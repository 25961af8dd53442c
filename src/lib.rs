//! LMS Server
//!
//! A Rust implementation of a library management backend, providing a
//! REST JSON API for accounts, the book catalog, physical copies,
//! circulation (borrow/return/renew) and reservations.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
