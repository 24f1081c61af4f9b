//! Buch Catalogue Server
//!
//! A REST JSON API for a books catalogue: searching, creating, versioned
//! updating and deleting of Buch records, with schema and ISBN validation.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
