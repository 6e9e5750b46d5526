use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{auth, handlers, AppState};

/// Builds the full application. Unmatched paths fall through to `static_dir` when one is given.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let admin_routes = Router::new()
        .route("/listings", post(handlers::create_listing))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_key,
        ));

    let api = Router::new()
        .route("/listings/nearby", get(handlers::nearby_listings))
        .route("/listings/:id", get(handlers::get_listing))
        .route("/listings/:id/images", get(handlers::listing_images))
        .nest("/admin", admin_routes);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(CorsLayer::permissive()).with_state(state)
}
