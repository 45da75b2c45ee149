//! Marker aggregation: one map position per distinct rounded coordinate

use crate::models::TravelRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A deduplicated map position representing one or more records sharing
/// rounded coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
}

/// Dedup key for a coordinate pair: both components formatted to exactly
/// five decimal places
///
/// Session matching uses the same key, so every marker produced by
/// [`unique_markers`] has at least one matching record.
pub fn coordinate_key(lat: f64, lng: f64) -> String {
    format!("{lat:.5}_{lng:.5}")
}

/// Group records into unique map positions
///
/// One marker per first-seen coordinate key, in input order (newest
/// first per the record store ordering). Records with non-finite
/// coordinates are skipped. Pure and order-stable.
pub fn unique_markers(records: &[TravelRecord]) -> Vec<Marker> {
    let mut seen = HashSet::new();
    let mut markers = Vec::new();
    for record in records {
        if !record.latitude.is_finite() || !record.longitude.is_finite() {
            continue;
        }
        let key = coordinate_key(record.latitude, record.longitude);
        if seen.insert(key) {
            markers.push(Marker {
                lat: record.latitude,
                lng: record.longitude,
            });
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(lat: f64, lng: f64) -> TravelRecord {
        let now = Utc::now();
        TravelRecord {
            id: Uuid::new_v4(),
            name: "Alex".to_string(),
            start_date: "2024-06-01".to_string(),
            end_date: None,
            destination_name: "Paris, France".to_string(),
            latitude: lat,
            longitude: lng,
            accommodation: None,
            rating: None,
            highlights: None,
            companion_type: Default::default(),
            budget_style: Default::default(),
            memorable_food: None,
            deepest_impression_spot: None,
            travel_tips: None,
            keyword_tags: Vec::new(),
            daily_brief_itinerary: None,
            uploaded_images: Vec::new(),
            duration: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn one_marker_per_rounded_position() {
        let records = vec![
            record(48.8566, 2.3522),
            // Differs only past the fifth decimal place
            record(48.856601, 2.352199),
            record(35.6762, 139.6503),
        ];
        let markers = unique_markers(&records);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].lat, 48.8566);
        assert_eq!(markers[1].lng, 139.6503);
    }

    #[test]
    fn preserves_first_seen_order_and_is_stable() {
        let records = vec![
            record(10.0, 20.0),
            record(30.0, 40.0),
            record(10.0, 20.0),
        ];
        let first = unique_markers(&records);
        let second = unique_markers(&records);
        assert_eq!(first, second);
        assert_eq!(first[0].lat, 10.0);
        assert_eq!(first[1].lat, 30.0);
    }

    #[test]
    fn skips_non_finite_coordinates() {
        let records = vec![record(f64::NAN, 2.0), record(1.0, f64::INFINITY)];
        assert!(unique_markers(&records).is_empty());
    }

    #[test]
    fn key_rounds_to_five_decimals() {
        assert_eq!(coordinate_key(48.8566, 2.3522), "48.85660_2.35220");
        assert_eq!(
            coordinate_key(48.856601, 2.352199),
            coordinate_key(48.8566, 2.3522)
        );
    }
}
