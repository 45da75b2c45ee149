//! Per-marker location session
//!
//! A marker click opens a session over the records matching that
//! position. The session pages through matched trips in `Details` mode,
//! then through the aggregated photo gallery in `Gallery` mode. Display
//! name and location photo resolve asynchronously through the
//! [`ReverseGeocoder`] and [`PhotoSource`] seams; a resolution carries
//! the generation token of the open that issued it and is discarded if
//! a later open has superseded that session.

use crate::map::marker::{coordinate_key, Marker};
use crate::models::TravelRecord;
use async_trait::async_trait;
use tracing::debug;

/// Display name used when no matched record names the position
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Error text shown when no representative photo could be found
pub const NO_IMAGE_MESSAGE: &str = "No general image found for this location.";

/// Resolves a position back to a locality-level place name
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Locality name for the position, `None` on any failure
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String>;
}

/// Finds a representative photo URL for a place name
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Servable photo URL, `None` when nothing was found
    async fn find_photo(&self, location: &str) -> Option<String>;
}

/// Display policy: a destination name with more than two comma-separated
/// components is treated as too specific for a marker heading and is
/// replaced by a reverse-geocoded locality when one resolves
pub fn needs_reverse_geocode(destination_name: &str) -> bool {
    destination_name.split(',').count() > 2
}

/// First comma-separated segment of a resolved place name, trimmed
fn city_of(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Session display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// One matched trip at a time
    Details,
    /// Aggregated photos from every matched trip
    Gallery,
}

/// One entry in the aggregated photo gallery / lightbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySlide {
    pub image_url: String,
    pub title: String,
    pub description: String,
}

/// Pending name/photo resolution work issued by an open
#[derive(Debug, Clone)]
pub struct OpenRequest {
    generation: u64,
    lat: f64,
    lng: f64,
    fallback_name: String,
    refine_name: bool,
}

/// Outcome of resolving an [`OpenRequest`]
#[derive(Debug, Clone)]
pub struct OpenResolution {
    generation: u64,
    city: String,
    photo: Option<String>,
}

/// Resolve the display name and representative photo for an open
///
/// Sequential by design: the name must resolve before the photo lookup
/// starts, since the photo query uses the resolved city.
pub async fn resolve_open(
    request: &OpenRequest,
    geocoder: &dyn ReverseGeocoder,
    photos: &dyn PhotoSource,
) -> OpenResolution {
    let mut display_name = request.fallback_name.clone();
    if request.refine_name {
        if let Some(locality) = geocoder.reverse_geocode(request.lat, request.lng).await {
            display_name = locality;
        }
    }
    let city = city_of(&display_name);
    let photo = photos.find_photo(&city).await;
    OpenResolution {
        generation: request.generation,
        city,
        photo,
    }
}

/// Ephemeral paging/display state for one opened marker
#[derive(Debug, Clone)]
pub struct LocationSession {
    position: Marker,
    matches: Vec<TravelRecord>,
    index: usize,
    mode: ViewMode,
    city: String,
    photo: Option<String>,
    photo_error: Option<String>,
    loading_photo: bool,
    slides: Vec<GallerySlide>,
    generation: u64,
}

impl LocationSession {
    pub fn position(&self) -> Marker {
        self.position
    }

    /// Matched records in store order (newest first)
    pub fn matches(&self) -> &[TravelRecord] {
        &self.matches
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Record shown in `Details` mode; `None` while no matches exist
    /// (the view shows a loading placeholder)
    pub fn current_record(&self) -> Option<&TravelRecord> {
        self.matches.get(self.index)
    }

    /// Resolved display city (fallback name until resolution applies)
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn photo_error(&self) -> Option<&str> {
        self.photo_error.as_deref()
    }

    pub fn is_loading_photo(&self) -> bool {
        self.loading_photo
    }

    /// Aggregated gallery slides; built on the details-to-gallery
    /// transition, also the lightbox source list
    pub fn slides(&self) -> &[GallerySlide] {
        &self.slides
    }

    /// Thumbnail URLs for the gallery view
    pub fn gallery_thumbnails(&self) -> impl Iterator<Item = &str> {
        self.slides.iter().map(|slide| slide.image_url.as_str())
    }

    fn enter_gallery(&mut self) {
        let mut slides = Vec::new();
        for record in &self.matches {
            for image_url in &record.uploaded_images {
                let description = record
                    .highlights
                    .clone()
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| record.destination_name.clone());
                slides.push(GallerySlide {
                    image_url: image_url.clone(),
                    title: format!("Photo from {}'s trip to {}", record.name, self.city),
                    description,
                });
            }
        }
        self.slides = slides;
        self.mode = ViewMode::Gallery;
    }
}

/// Owner of the active location session
///
/// Opening a marker supersedes any prior session; the generation counter
/// tags each open so a name/photo resolution arriving after a newer open
/// is dropped instead of overwriting fresher state.
#[derive(Debug, Default)]
pub struct MapView {
    generation: u64,
    session: Option<LocationSession>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&LocationSession> {
        self.session.as_ref()
    }

    /// Open a session at the clicked position
    ///
    /// Matches are the records whose rounded coordinates equal the
    /// rounded click position, preserving input order. The returned
    /// request carries the name/photo resolution work; feed its outcome
    /// back through [`MapView::apply`].
    pub fn open(&mut self, lat: f64, lng: f64, records: &[TravelRecord]) -> OpenRequest {
        let key = coordinate_key(lat, lng);
        let matches: Vec<TravelRecord> = records
            .iter()
            .filter(|r| {
                r.latitude.is_finite()
                    && r.longitude.is_finite()
                    && coordinate_key(r.latitude, r.longitude) == key
            })
            .cloned()
            .collect();

        let fallback_name = matches
            .first()
            .map(|r| r.destination_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        // Reverse geocode when the first match has no usable name, the
        // name looks too specific, or nothing matched at all.
        let refine_name = matches
            .first()
            .map_or(true, |r| {
                r.destination_name.is_empty() || needs_reverse_geocode(&r.destination_name)
            });

        self.generation += 1;
        self.session = Some(LocationSession {
            position: Marker { lat, lng },
            matches,
            index: 0,
            mode: ViewMode::Details,
            city: city_of(&fallback_name),
            photo: None,
            photo_error: None,
            loading_photo: true,
            slides: Vec::new(),
            generation: self.generation,
        });

        OpenRequest {
            generation: self.generation,
            lat,
            lng,
            fallback_name,
            refine_name,
        }
    }

    /// Apply a resolved open outcome to the active session
    ///
    /// Stale resolutions (issued by a superseded open) and resolutions
    /// arriving after close are discarded.
    pub fn apply(&mut self, resolution: OpenResolution) {
        let Some(session) = self.session.as_mut() else {
            debug!("Discarding resolution: session closed");
            return;
        };
        if session.generation != resolution.generation {
            debug!(
                stale = resolution.generation,
                current = session.generation,
                "Discarding stale open resolution"
            );
            return;
        }
        session.city = resolution.city;
        session.loading_photo = false;
        match resolution.photo {
            Some(url) => {
                session.photo = Some(url);
                session.photo_error = None;
            }
            None => {
                session.photo = None;
                session.photo_error = Some(NO_IMAGE_MESSAGE.to_string());
            }
        }
    }

    /// Advance: next trip in `Details` mode, or transition to `Gallery`
    /// from the last trip; no-op once in `Gallery`
    pub fn next(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.mode {
            ViewMode::Details => {
                if session.index + 1 < session.matches.len() {
                    session.index += 1;
                } else {
                    session.enter_gallery();
                }
            }
            ViewMode::Gallery => {}
        }
    }

    /// Step back: `Gallery` returns to `Details` at the index that was
    /// active before the transition; `Details` decrements, stopping at 0
    pub fn prev(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.mode {
            ViewMode::Gallery => session.mode = ViewMode::Details,
            ViewMode::Details => {
                if session.index > 0 {
                    session.index -= 1;
                }
            }
        }
    }

    /// Close the session, resetting all display state
    pub fn close(&mut self) {
        self.session = None;
    }
}
