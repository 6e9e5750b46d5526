use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::geo::{GeoPoint, DEFAULT_RADIUS_M};
use crate::models::{
    CreateListingRequest, Listing, ListingDetail, ListingId, ListingImage, NearbyListing,
    NearbyQuery,
};
use crate::AppState;

pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Raw query string of `/api/listings/nearby`. Kept as text so that a missing or
/// malformed number becomes our own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

impl NearbyParams {
    pub fn into_query(self) -> Result<NearbyQuery, AppError> {
        let (lat, lng) = match (non_empty(self.lat), non_empty(self.lng)) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(AppError::BadRequest("lat and lng are required".to_string())),
        };
        let latitude = parse_number("lat", &lat)?;
        let longitude = parse_number("lng", &lng)?;
        let radius_m = match non_empty(self.radius) {
            Some(radius) => parse_number("radius", &radius)?,
            None => DEFAULT_RADIUS_M,
        };

        Ok(NearbyQuery {
            center: GeoPoint::from_xy(longitude, latitude),
            radius_m,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number(name: &str, raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::BadRequest(format!("{} must be a number", name)))
}

fn parse_listing_id(raw: &str) -> Result<ListingId, AppError> {
    raw.parse::<ListingId>()
        .map_err(|_| AppError::BadRequest(format!("invalid listing id: {}", raw)))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// GET /api/listings/nearby?lat=&lng=&radius=
pub async fn nearby_listings(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> HandlerResult<Vec<NearbyListing>> {
    let Query(params) = params
        .map_err(|e| AppError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;
    let query = params.into_query()?;
    let rows = state.store.find_nearby(query).await?;
    info!(
        "Found {} listings within {}m of ({}, {})",
        rows.len(),
        query.radius_m,
        query.center.latitude,
        query.center.longitude
    );
    Ok(Json(rows))
}

/// GET /api/listings/:id
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<ListingDetail> {
    let id = parse_listing_id(&id)?;
    match state.store.find_listing(id).await? {
        Some(detail) => Ok(Json(detail)),
        None => {
            info!("Listing {} not found", id);
            Err(AppError::NotFound("Listing not found".to_string()))
        }
    }
}

/// GET /api/listings/:id/images
pub async fn listing_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Vec<ListingImage>> {
    let id = parse_listing_id(&id)?;
    Ok(Json(state.store.list_images(id).await?))
}

/// POST /api/admin/listings
///
/// The admin key is checked by [`crate::auth::require_admin_key`] before this runs.
pub async fn create_listing(
    State(state): State<AppState>,
    payload: Result<Json<CreateListingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;

    let new_listing = request.validate().map_err(|missing| {
        AppError::BadRequest(format!("Missing required fields: {}", missing.join(", ")))
    })?;

    let listing = state.store.create_listing(new_listing).await?;
    info!("Created listing {} for host {}", listing.id, listing.host_id);
    Ok((StatusCode::CREATED, Json(listing)))
}
