//! Circulus library circulation core
//!
//! The engine behind a library circulation platform: a rebuildable
//! prefix-search index over the catalog, a per-session recently-viewed
//! cache, and the lending state machine that moves borrow requests through
//! approval, issuance, return, and waitlisting. Routing, rendering, and
//! authentication are external collaborators that call into this crate.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod session;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorCode};

/// Application state shared across all callers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(&config);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
