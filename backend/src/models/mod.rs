use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Double, Int4, Int8, Nullable, Text, Timestamptz};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

pub type ListingId = i32;

/// A listing row with its point decoded as `longitude = X`, `latitude = Y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, QueryableByName)]
pub struct Listing {
    #[diesel(sql_type = Int4)]
    pub id: ListingId,
    #[diesel(sql_type = Int4)]
    pub host_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Int8)]
    pub price_kes: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pub location_name: Option<String>,
    #[diesel(sql_type = Bool)]
    pub is_active: bool,
    #[diesel(sql_type = Bool)]
    pub is_featured: bool,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Double)]
    pub longitude: f64,
    #[diesel(sql_type = Double)]
    pub latitude: f64,
}

impl Listing {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::from_xy(self.longitude, self.latitude)
    }
}

/// The `{id, image_url}` shape used in every image list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = crate::schema::listing_images)]
pub struct ListingImage {
    pub id: i32,
    pub image_url: String,
}

/// Proximity search result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Meters from the search center.
    pub distance: f64,
    pub images: Vec<ListingImage>,
}

/// Single listing with host contact fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub host_name: Option<String>,
    pub host_phone: Option<String>,
    pub host_whatsapp: Option<String>,
    pub images: Vec<ListingImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

/// Parameters of a proximity search, already validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_m: f64,
}

/// Validated admin payload, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub host_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price_kes: i64,
    pub point: GeoPoint,
    pub location_name: Option<String>,
}

/// Raw admin payload. Every field is optional here so a missing field is a 400
/// from [`CreateListingRequest::validate`] rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListingRequest {
    pub host_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_kes: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
}

impl CreateListingRequest {
    /// Presence check for the required fields. Returns the names of the missing ones on failure.
    pub fn validate(self) -> Result<NewListing, Vec<&'static str>> {
        let mut missing = Vec::new();
        let title = self.title.filter(|t| !t.trim().is_empty());

        if self.host_id.is_none() {
            missing.push("host_id");
        }
        if title.is_none() {
            missing.push("title");
        }
        if self.price_kes.is_none() {
            missing.push("price_kes");
        }
        if self.latitude.is_none() {
            missing.push("latitude");
        }
        if self.longitude.is_none() {
            missing.push("longitude");
        }

        match (self.host_id, title, self.price_kes, self.latitude, self.longitude) {
            (Some(host_id), Some(title), Some(price_kes), Some(latitude), Some(longitude)) => {
                Ok(NewListing {
                    host_id,
                    title,
                    description: self.description,
                    price_kes,
                    point: GeoPoint::from_xy(longitude, latitude),
                    location_name: self.location_name,
                })
            }
            _ => Err(missing),
        }
    }
}
