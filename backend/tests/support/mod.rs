#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use listings_backend::geo::{GeoPoint, EARTH_RADIUS_M};
use listings_backend::models::{Host, Listing, ListingId};
use listings_backend::store::MemoryListingStore;
use listings_backend::{create_router, AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";

pub const NAIROBI: GeoPoint = GeoPoint {
    longitude: 36.8219,
    latitude: -1.2921,
};

/// A point `meters` due north of Nairobi.
pub fn north_of_nairobi(meters: f64) -> GeoPoint {
    let degrees = (meters / EARTH_RADIUS_M).to_degrees();
    GeoPoint::from_xy(NAIROBI.longitude, NAIROBI.latitude + degrees)
}

pub fn listing(id: ListingId, at: GeoPoint, is_active: bool, is_featured: bool) -> Listing {
    Listing {
        id,
        host_id: 1,
        title: format!("Listing {}", id),
        description: Some("Self-contained unit".to_string()),
        price_kes: 2500,
        location_name: Some("Westlands".to_string()),
        is_active,
        is_featured,
        created_at: Utc::now(),
        longitude: at.longitude,
        latitude: at.latitude,
    }
}

pub async fn store_with_host() -> Arc<MemoryListingStore> {
    let store = Arc::new(MemoryListingStore::new());
    store
        .insert_host(Host {
            id: 1,
            name: "Otieno".to_string(),
            phone: Some("+254711000111".to_string()),
            whatsapp: Some("+254711000222".to_string()),
        })
        .await;
    store
}

pub fn app(store: Arc<MemoryListingStore>) -> Router {
    create_router(AppState::new(store, Some(ADMIN_KEY.to_string())), None)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_listing(key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/admin/listings")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-admin-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
