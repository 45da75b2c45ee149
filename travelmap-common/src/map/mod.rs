//! Map core: marker aggregation and the per-marker location session
//!
//! The map view groups records into deduplicated markers, then a click
//! on a marker opens a location session that pages through the matching
//! trips and their combined photo gallery.

pub mod form;
pub mod marker;
pub mod session;

pub use form::TravelForm;
pub use marker::{coordinate_key, unique_markers, Marker};
pub use session::{
    needs_reverse_geocode, resolve_open, GallerySlide, LocationSession, MapView, OpenRequest,
    OpenResolution, PhotoSource, ReverseGeocoder, ViewMode,
};
