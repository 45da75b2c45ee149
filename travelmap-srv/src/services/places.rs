//! Google Places photo lookup client and photo proxy backend

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use travelmap_common::map::session::PhotoSource;

use super::{PhotoFinder, PhotoStream, UpstreamError};

const FIND_PLACE_URL: &str =
    "https://maps.googleapis.com/maps/api/place/findplacefromtext/json";
const PLACE_PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";
const USER_AGENT: &str = concat!("travelmap/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const PHOTO_MAX_WIDTH: &str = "800";

/// Build the ordered query variants tried for a location, most specific
/// travel-photo phrasing first, the bare name last
pub fn query_variants(location: &str) -> Vec<String> {
    vec![
        format!("{location} famous place"),
        format!("{location} landmark"),
        format!("{location} skyline"),
        format!("{location} city view"),
        format!("{location} tourist attraction"),
        format!("{location} travel photo"),
        format!("{location} cityscape"),
        location.to_string(),
    ]
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct PlaceCandidate {
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

/// Google Places photo client
///
/// Without an API key, photo searches return nothing (fail closed) and
/// proxy fetches report the missing credential.
pub struct PlacePhotoClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl PlacePhotoClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        if api_key.is_none() {
            warn!("Places client created without API key; photo lookups will fail closed");
        }
        Self {
            http_client,
            api_key,
        }
    }

    /// Photo reference for a single search query, if the top candidate
    /// carries one
    async fn photo_reference(&self, query: &str) -> Result<Option<String>, UpstreamError> {
        let key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        let response = self
            .http_client
            .get(FIND_PLACE_URL)
            .query(&[
                ("input", query),
                ("inputtype", "textquery"),
                ("fields", "photos"),
                ("key", key),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let body: FindPlaceResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(body
            .candidates
            .first()
            .and_then(|candidate| candidate.photos.first())
            .map(|photo| photo.photo_reference.clone()))
    }
}

#[async_trait]
impl PhotoFinder for PlacePhotoClient {
    async fn find_photo_url(&self, location: &str) -> Result<Option<String>, UpstreamError> {
        if self.api_key.is_none() {
            // Fail closed rather than surfacing a credential error
            error!("Google API key is not set; skipping photo search");
            return Ok(None);
        }

        let variants = query_variants(location);
        let total = variants.len();
        let mut errors = 0;
        let mut last_error = None;
        for variant in variants {
            match self.photo_reference(&variant).await {
                Ok(Some(reference)) => {
                    debug!(location = %location, variant = %variant, "Found place photo");
                    return Ok(Some(format!("/api/image-search/photo?ref={reference}")));
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(variant = %variant, error = %e, "Place photo lookup failed");
                    errors += 1;
                    last_error = Some(e);
                }
            }
        }

        // Upstream failure only when every single call errored
        match last_error {
            Some(e) if errors == total => Err(e),
            _ => Ok(None),
        }
    }

    async fn fetch_photo(&self, reference: &str) -> Result<PhotoStream, UpstreamError> {
        let key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        let response = self
            .http_client
            .get(PLACE_PHOTO_URL)
            .query(&[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photoreference", reference),
                ("key", key),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            error!(status = %response.status(), "Failed to stream place photo");
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            .boxed();

        Ok(PhotoStream { content_type, data })
    }
}

// Map clients drive the location session through this seam.
#[async_trait]
impl PhotoSource for PlacePhotoClient {
    async fn find_photo(&self, location: &str) -> Option<String> {
        self.find_photo_url(location).await.ok().flatten()
    }
}
