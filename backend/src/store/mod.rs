//! Store capability used by the handlers.
//!
//! The handlers only need four geospatial-aware operations: a radius search
//! with distance, a single-row fetch joined with its host, an image list and
//! an insert. [`PgListingStore`] answers them with PostGIS; [`MemoryListingStore`]
//! answers them in process for tests and local development.

use async_trait::async_trait;

use crate::models::{Listing, ListingDetail, ListingId, ListingImage, NearbyListing, NearbyQuery, NewListing};

pub mod memory;
pub mod postgres;

pub use memory::MemoryListingStore;
pub use postgres::PgListingStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error in {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: diesel::result::Error,
    },

    #[error("could not decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("task join error: {0}")]
    Task(String),

    /// Raised by the in-memory store when a row references a missing parent.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl StoreError {
    pub fn query(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> Self {
        move |source| StoreError::Query { operation, source }
    }
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<bool>;

    /// Active listings within `query.radius_m` of `query.center`, featured first, then nearest.
    async fn find_nearby(&self, query: NearbyQuery) -> StoreResult<Vec<NearbyListing>>;

    async fn find_listing(&self, id: ListingId) -> StoreResult<Option<ListingDetail>>;

    /// Images of a listing ordered by id. Unknown listings yield an empty list.
    async fn list_images(&self, listing_id: ListingId) -> StoreResult<Vec<ListingImage>>;

    async fn create_listing(&self, listing: NewListing) -> StoreResult<Listing>;
}
