//! travelmap-srv library interface
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod ingest;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::{Geocoder, PhotoFinder};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Destination/reverse geocoding service
    pub geocoder: Arc<dyn Geocoder>,
    /// Place photo lookup and proxy service
    pub photos: Arc<dyn PhotoFinder>,
    /// Directory holding uploaded images
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        geocoder: Arc<dyn Geocoder>,
        photos: Arc<dyn PhotoFinder>,
        uploads_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            geocoder,
            photos,
            uploads_dir,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let uploads_dir = state.uploads_dir.clone();

    Router::new()
        .route(
            "/api/travel-records",
            get(api::list_records).post(api::create_record),
        )
        .route("/api/markers", get(api::list_markers))
        // Static segment wins over the :location_name capture
        .route("/api/image-search/photo", get(api::photo_proxy))
        .route("/api/image-search/:location_name", get(api::search_location))
        .route("/api/uploads", post(api::upload_images))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
