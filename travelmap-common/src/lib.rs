//! Shared types for the travelmap services
//!
//! Holds the persisted record model, configuration loading, and the map
//! core (marker aggregation and the per-marker location session) consumed
//! by both the backend and map clients.

pub mod config;
pub mod error;
pub mod map;
pub mod models;

pub use error::{Error, Result};
