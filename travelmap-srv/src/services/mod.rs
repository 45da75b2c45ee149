//! External service clients (Google Geocoding and Places APIs)
//!
//! All provider failures are caught here, logged, and folded into
//! `None`/error values; they never propagate as panics or raw transport
//! errors past this boundary. A missing API credential fails closed.

pub mod geocoding;
pub mod places;

pub use geocoding::GeocodingClient;
pub use places::{query_variants, PlacePhotoClient};

use async_trait::async_trait;
use axum::body::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;
use travelmap_common::models::Coordinates;

/// Upstream provider failure for calls that must distinguish "nothing
/// found" from "provider broken"
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// API credential not configured
    #[error("API key not configured")]
    MissingApiKey,

    /// Transport-level failure
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status from the provider
    #[error("Upstream returned status {0}")]
    Status(u16),
}

/// A streamed photo response from the upstream provider
pub struct PhotoStream {
    /// Upstream content type, passed through to the client
    pub content_type: String,
    pub data: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Destination and reverse geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best-guess coordinates for a free-text destination; `None` on
    /// non-OK status, zero results, or any transport error
    async fn geocode(&self, destination: &str) -> Option<Coordinates>;

    /// Locality-level place name for a position; same failure contract
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String>;
}

/// Place photo lookup and retrieval
#[async_trait]
pub trait PhotoFinder: Send + Sync {
    /// Proxy URL for the first photo any query variant yields
    ///
    /// `Ok(None)` when every variant came back empty (including the
    /// missing-credential fail-closed case); `Err` only when every
    /// attempt failed at the provider.
    async fn find_photo_url(&self, location: &str) -> Result<Option<String>, UpstreamError>;

    /// Stream the photo bytes behind a photo reference
    async fn fetch_photo(&self, reference: &str) -> Result<PhotoStream, UpstreamError>;
}
