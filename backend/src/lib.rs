//! HTTP API for a location-based listings marketplace.
//!
//! Routes live in [`router`], request handling in [`handlers`], and all data
//! access goes through the [`store::ListingStore`] capability so the PostGIS
//! backend can be swapped for [`store::MemoryListingStore`].

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod router;
pub mod schema;
pub mod store;

pub use router::create_router;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::ListingStore>,
    pub admin_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn store::ListingStore>, admin_key: Option<String>) -> Self {
        Self {
            store,
            admin_key: admin_key.map(Arc::from),
        }
    }
}
