// src/state.rs
use crate::cache::QueryCache;
use crate::db::Database;
use crate::forecast::ForecastSettings;
use std::sync::Arc;

/// Everything a request handler needs. Cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: Arc<QueryCache>,
    pub forecast: ForecastSettings,
}

impl AppState {
    pub fn new(db: Database, forecast: ForecastSettings) -> Self {
        Self {
            db,
            cache: Arc::new(QueryCache::new()),
            forecast,
        }
    }
}
