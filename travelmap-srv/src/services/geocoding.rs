//! Google Geocoding API client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use travelmap_common::map::session::ReverseGeocoder;
use travelmap_common::models::Coordinates;

use super::Geocoder;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const USER_AGENT: &str = concat!("travelmap/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Address component type marking a city-level name
const LOCALITY_TYPE: &str = "locality";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// Google Geocoding API client
///
/// Without an API key every lookup returns `None` (fail closed).
pub struct GeocodingClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl GeocodingClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        if api_key.is_none() {
            warn!("Geocoding client created without API key; lookups will fail closed");
        }
        Self {
            http_client,
            api_key,
        }
    }

    async fn query(&self, params: &[(&str, &str)]) -> Option<GeocodeResponse> {
        let key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                error!("Google API key is not set");
                return None;
            }
        };

        let response = self
            .http_client
            .get(GEOCODE_URL)
            .query(params)
            .query(&[("key", key.as_str())])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                error!("Error calling Geocoding API: {}", e);
                return None;
            }
        };

        match response.json::<GeocodeResponse>().await {
            Ok(body) => Some(body),
            Err(e) => {
                error!("Failed to parse Geocoding API response: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn geocode(&self, destination: &str) -> Option<Coordinates> {
        let body = self.query(&[("address", destination)]).await?;

        if body.status != "OK" || body.results.is_empty() {
            error!(
                destination = %destination,
                status = %body.status,
                error = %body.error_message.as_deref().unwrap_or(""),
                "Geocoding failed"
            );
            return None;
        }

        let location = &body.results[0].geometry.location;
        debug!(destination = %destination, lat = location.lat, lng = location.lng, "Geocoded destination");
        Some(Coordinates {
            lat: location.lat,
            lng: location.lng,
        })
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        let latlng = format!("{lat},{lng}");
        let body = self.query(&[("latlng", latlng.as_str())]).await?;

        if body.status != "OK" {
            warn!(status = %body.status, "Reverse geocoding failed");
            return None;
        }

        body.results.first().and_then(|result| {
            result
                .address_components
                .iter()
                .find(|component| component.types.iter().any(|t| t == LOCALITY_TYPE))
                .map(|component| component.long_name.clone())
        })
    }
}

// Map clients drive the location session through this seam.
#[async_trait]
impl ReverseGeocoder for GeocodingClient {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
        Geocoder::reverse_geocode(self, lat, lng).await
    }
}
