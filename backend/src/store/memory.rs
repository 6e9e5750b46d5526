//! In-process store for tests and running without a database.
//!
//! Distances are haversine on a sphere; the same value decides radius
//! membership and is reported back, so the two can never disagree.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ListingStore, StoreError, StoreResult};
use crate::models::{
    Host, Listing, ListingDetail, ListingId, ListingImage, NearbyListing, NearbyQuery, NewListing,
};

#[derive(Default)]
struct Tables {
    hosts: BTreeMap<i32, Host>,
    listings: BTreeMap<ListingId, Listing>,
    // (listing_id, image), kept in id order
    images: Vec<(ListingId, ListingImage)>,
    next_listing_id: ListingId,
    next_image_id: i32,
}

impl Tables {
    fn images_of(&self, listing_id: ListingId) -> Vec<ListingImage> {
        self.images
            .iter()
            .filter(|(owner, _)| *owner == listing_id)
            .map(|(_, image)| image.clone())
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryListingStore {
    tables: RwLock<Tables>,
    queries: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_host(&self, host: Host) {
        self.tables.write().await.hosts.insert(host.id, host);
    }

    /// Seeds a complete row as-is, including flags a create would default.
    pub async fn insert_listing(&self, listing: Listing) {
        let mut tables = self.tables.write().await;
        tables.next_listing_id = tables.next_listing_id.max(listing.id);
        tables.listings.insert(listing.id, listing);
    }

    pub async fn add_image(
        &self,
        listing_id: ListingId,
        image_url: impl Into<String>,
    ) -> StoreResult<ListingImage> {
        let mut tables = self.tables.write().await;
        if !tables.listings.contains_key(&listing_id) {
            return Err(StoreError::Constraint(format!(
                "listing {} does not exist",
                listing_id
            )));
        }
        tables.next_image_id += 1;
        let image = ListingImage {
            id: tables.next_image_id,
            image_url: image_url.into(),
        };
        tables.images.push((listing_id, image.clone()));
        Ok(image)
    }

    /// Makes every subsequent operation fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of store operations attempted so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self) -> StoreResult<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn health_check(&self) -> StoreResult<bool> {
        self.begin()?;
        Ok(true)
    }

    async fn find_nearby(&self, query: NearbyQuery) -> StoreResult<Vec<NearbyListing>> {
        self.begin()?;
        let tables = self.tables.read().await;

        let mut rows: Vec<NearbyListing> = tables
            .listings
            .values()
            .filter(|listing| listing.is_active)
            .filter_map(|listing| {
                let distance = query.center.distance_to(&listing.point());
                (distance <= query.radius_m).then(|| NearbyListing {
                    listing: listing.clone(),
                    distance,
                    images: tables.images_of(listing.id),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.listing
                .is_featured
                .cmp(&a.listing.is_featured)
                .then_with(|| a.distance.total_cmp(&b.distance))
        });
        Ok(rows)
    }

    async fn find_listing(&self, id: ListingId) -> StoreResult<Option<ListingDetail>> {
        self.begin()?;
        let tables = self.tables.read().await;

        Ok(tables.listings.get(&id).map(|listing| {
            let host = tables.hosts.get(&listing.host_id);
            ListingDetail {
                listing: listing.clone(),
                host_name: host.map(|h| h.name.clone()),
                host_phone: host.and_then(|h| h.phone.clone()),
                host_whatsapp: host.and_then(|h| h.whatsapp.clone()),
                images: tables.images_of(id),
            }
        }))
    }

    async fn list_images(&self, listing_id: ListingId) -> StoreResult<Vec<ListingImage>> {
        self.begin()?;
        Ok(self.tables.read().await.images_of(listing_id))
    }

    async fn create_listing(&self, new: NewListing) -> StoreResult<Listing> {
        self.begin()?;
        let mut tables = self.tables.write().await;
        if !tables.hosts.contains_key(&new.host_id) {
            return Err(StoreError::Constraint(format!(
                "host {} does not exist",
                new.host_id
            )));
        }

        tables.next_listing_id += 1;
        let listing = Listing {
            id: tables.next_listing_id,
            host_id: new.host_id,
            title: new.title,
            description: new.description,
            price_kes: new.price_kes,
            location_name: new.location_name,
            is_active: true,
            is_featured: false,
            created_at: Utc::now(),
            longitude: new.point.x(),
            latitude: new.point.y(),
        };
        tables.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }
}
