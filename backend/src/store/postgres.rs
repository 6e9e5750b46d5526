//! PostGIS-backed store.
//!
//! Every geography value is built with `ST_MakePoint(longitude, latitude)` and
//! decoded with `ST_X` as longitude and `ST_Y` as latitude. The radius filter
//! (`ST_DWithin`) and the reported distance (`ST_Distance`) both run on the
//! geography type with the default spheroid, so a returned row never reports a
//! distance larger than the radius it matched.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Double, Int4, Int8, Json, Nullable, Text};
use tokio::task;

use super::{ListingStore, StoreError, StoreResult};
use crate::db::PgPool;
use crate::models::{
    Listing, ListingDetail, ListingId, ListingImage, NearbyListing, NearbyQuery, NewListing,
};
use crate::schema::listing_images;

const LISTING_COLUMNS: &str = "l.id, l.host_id, l.title, l.description, l.price_kes, \
     l.location_name, l.is_active, l.is_featured, l.created_at, \
     ST_X(l.location::geometry) AS longitude, ST_Y(l.location::geometry) AS latitude";

const IMAGES_LATERAL: &str = "LEFT JOIN LATERAL ( \
         SELECT json_agg(json_build_object('id', i.id, 'image_url', i.image_url) ORDER BY i.id) AS images \
         FROM listing_images i WHERE i.listing_id = l.id \
     ) img ON TRUE";

#[derive(QueryableByName)]
struct NearbyRow {
    #[diesel(embed)]
    listing: Listing,
    #[diesel(sql_type = Double)]
    distance: f64,
    #[diesel(sql_type = Json)]
    images: serde_json::Value,
}

#[derive(QueryableByName)]
struct DetailRow {
    #[diesel(embed)]
    listing: Listing,
    #[diesel(sql_type = Nullable<Text>)]
    host_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    host_phone: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    host_whatsapp: Option<String>,
    #[diesel(sql_type = Json)]
    images: serde_json::Value,
}

fn decode_images(value: serde_json::Value) -> StoreResult<Vec<ListingImage>> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode {
        what: "images",
        message: e.to_string(),
    })
}

fn nearby_sql() -> String {
    format!(
        "SELECT {LISTING_COLUMNS}, \
                ST_Distance(l.location, c.point) AS distance, \
                COALESCE(img.images, '[]'::json) AS images \
         FROM listings l \
         CROSS JOIN (SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point) c \
         {IMAGES_LATERAL} \
         WHERE l.is_active = TRUE AND ST_DWithin(l.location, c.point, $3) \
         ORDER BY l.is_featured DESC, distance ASC"
    )
}

fn detail_sql() -> String {
    format!(
        "SELECT {LISTING_COLUMNS}, \
                u.name AS host_name, u.phone AS host_phone, u.whatsapp AS host_whatsapp, \
                COALESCE(img.images, '[]'::json) AS images \
         FROM listings l \
         LEFT JOIN users u ON u.id = l.host_id \
         {IMAGES_LATERAL} \
         WHERE l.id = $1"
    )
}

const INSERT_SQL: &str = "INSERT INTO listings AS l \
         (host_id, title, description, price_kes, location, location_name) \
     VALUES ($1, $2, $3, $4, ST_SetSRID(ST_MakePoint($5, $6), 4326)::geography, $7) \
     RETURNING l.id, l.host_id, l.title, l.description, l.price_kes, \
         l.location_name, l.is_active, l.is_featured, l.created_at, \
         ST_X(l.location::geometry) AS longitude, ST_Y(l.location::geometry) AS latitude";

/// Diesel store over a shared r2d2 pool.
#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs `f` on a pooled connection on the blocking thread pool. The connection
    /// goes back to the pool when the guard drops, whatever `f` returned.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn health_check(&self) -> StoreResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(StoreError::query("health_check"))
        })
        .await
    }

    async fn find_nearby(&self, query: NearbyQuery) -> StoreResult<Vec<NearbyListing>> {
        self.with_conn(move |conn| {
            let rows = sql_query(nearby_sql())
                .bind::<Double, _>(query.center.x())
                .bind::<Double, _>(query.center.y())
                .bind::<Double, _>(query.radius_m)
                .load::<NearbyRow>(conn)
                .map_err(StoreError::query("find_nearby"))?;

            rows.into_iter()
                .map(|row| -> StoreResult<NearbyListing> {
                    Ok(NearbyListing {
                        listing: row.listing,
                        distance: row.distance,
                        images: decode_images(row.images)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn find_listing(&self, id: ListingId) -> StoreResult<Option<ListingDetail>> {
        self.with_conn(move |conn| {
            let row = sql_query(detail_sql())
                .bind::<Int4, _>(id)
                .get_result::<DetailRow>(conn)
                .optional()
                .map_err(StoreError::query("find_listing"))?;

            row.map(|row| -> StoreResult<ListingDetail> {
                Ok(ListingDetail {
                    listing: row.listing,
                    host_name: row.host_name,
                    host_phone: row.host_phone,
                    host_whatsapp: row.host_whatsapp,
                    images: decode_images(row.images)?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn list_images(&self, listing_id: ListingId) -> StoreResult<Vec<ListingImage>> {
        self.with_conn(move |conn| {
            listing_images::table
                .filter(listing_images::listing_id.eq(listing_id))
                .order(listing_images::id.asc())
                .select(ListingImage::as_select())
                .load(conn)
                .map_err(StoreError::query("list_images"))
        })
        .await
    }

    async fn create_listing(&self, listing: NewListing) -> StoreResult<Listing> {
        self.with_conn(move |conn| {
            // ST_MakePoint takes (x, y): longitude first.
            sql_query(INSERT_SQL)
                .bind::<Int4, _>(listing.host_id)
                .bind::<Text, _>(listing.title)
                .bind::<Nullable<Text>, _>(listing.description)
                .bind::<Int8, _>(listing.price_kes)
                .bind::<Double, _>(listing.point.x())
                .bind::<Double, _>(listing.point.y())
                .bind::<Nullable<Text>, _>(listing.location_name)
                .get_result::<Listing>(conn)
                .map_err(StoreError::query("create_listing"))
        })
        .await
    }
}
