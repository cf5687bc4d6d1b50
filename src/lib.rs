//! UniLib - University Library Catalog Server
//!
//! A Rust REST server for a university library catalog: registration and
//! session-based authentication, role-gated administration, multi-source
//! book search, PDF attachments and per-user saved-book libraries.

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
