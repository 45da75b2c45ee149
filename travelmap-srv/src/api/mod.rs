//! HTTP API handlers

mod health;
mod image_search;
mod records;
mod uploads;

pub use health::{health_check, health_routes};
pub use image_search::{photo_proxy, search_location};
pub use records::{create_record, list_markers, list_records};
pub use uploads::upload_images;
