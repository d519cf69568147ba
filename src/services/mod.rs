//! Business logic services

pub mod catalog;
pub mod lending;

use std::sync::Arc;

use crate::{config::AppConfig, search::SearchIndexStore, store::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
}

impl Services {
    /// Create all services over a shared in-memory store.
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(Store::new());
        let index = Arc::new(SearchIndexStore::new());
        Self {
            catalog: catalog::CatalogService::new(
                store.clone(),
                index,
                config.catalog.clone(),
            ),
            lending: lending::LendingService::new(store, config.lending.clone()),
        }
    }
}
