//! Record ingestion: validate and normalize a submission, geocode the
//! destination, and write through the record store
//!
//! Exactly one record is persisted on full success; every failure path
//! leaves the store untouched.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;
use travelmap_common::models::{
    duration_days, BudgetStyle, CompanionType, OneOrMany, RatingValue, RecordSubmission,
    TravelRecord,
};
use uuid::Uuid;

use crate::db;
use crate::services::Geocoder;

/// Field-name/message pairs for schema-level rejections
pub type FieldErrors = BTreeMap<String, String>;

/// Submission failure taxonomy
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required fields absent or empty; user-correctable
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// Field values present but malformed; carries per-field detail
    #[error("Invalid field values")]
    InvalidFields { details: FieldErrors },

    /// Destination unresolvable; user-correctable by editing the text
    #[error("Could not geocode destination: {0}. Check API key and destination name.")]
    Geocode(String),

    /// Store-level rejection
    #[error("Failed to persist travel record: {0}")]
    Persistence(#[from] anyhow::Error),
}

/// Validate, normalize, geocode, and persist a record submission
pub async fn submit(
    pool: &SqlitePool,
    geocoder: &dyn Geocoder,
    payload: RecordSubmission,
) -> Result<TravelRecord, IngestError> {
    // Required fields are checked before any external call is made
    let missing: Vec<&str> = [
        ("name", payload.name.trim().is_empty()),
        ("startDate", payload.start_date.trim().is_empty()),
        ("destinationName", payload.destination_name.trim().is_empty()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(field, _)| *field)
    .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingFields(missing.join(", ")));
    }

    let mut details = FieldErrors::new();
    let rating = coerce_rating(payload.rating.as_ref(), &mut details);
    let companion_type = parse_enum_field(
        payload.companion_type.as_deref(),
        CompanionType::parse,
        "companionType",
        &mut details,
    );
    let budget_style = parse_enum_field(
        payload.budget_style.as_deref(),
        BudgetStyle::parse,
        "budgetStyle",
        &mut details,
    );
    if !details.is_empty() {
        return Err(IngestError::InvalidFields { details });
    }

    let keyword_tags = normalize_tags(payload.keyword_tags);
    let uploaded_images = normalize_images(payload.uploaded_images);

    let duration = payload
        .end_date
        .as_deref()
        .and_then(|end| duration_days(&payload.start_date, end));

    let coordinates = geocoder
        .geocode(&payload.destination_name)
        .await
        .ok_or_else(|| IngestError::Geocode(payload.destination_name.clone()))?;

    let now = Utc::now();
    let record = TravelRecord {
        id: Uuid::new_v4(),
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        destination_name: payload.destination_name,
        latitude: coordinates.lat,
        longitude: coordinates.lng,
        accommodation: payload.accommodation.filter(|s| !s.is_empty()),
        rating,
        highlights: payload.highlights,
        companion_type,
        budget_style,
        memorable_food: payload.memorable_food,
        deepest_impression_spot: payload.deepest_impression_spot,
        travel_tips: payload.travel_tips,
        keyword_tags,
        daily_brief_itinerary: payload.daily_brief_itinerary,
        uploaded_images,
        duration,
        created_at: now,
        updated_at: now,
    };

    db::records::insert(pool, &record).await?;
    info!(
        id = %record.id,
        destination = %record.destination_name,
        "Created travel record"
    );
    Ok(record)
}

/// Normalize tags: a list is trimmed entry-wise; a single string is
/// split on commas. Empty entries drop out, duplicates stay.
pub fn normalize_tags(tags: Option<OneOrMany>) -> Vec<String> {
    match tags {
        None => Vec::new(),
        Some(OneOrMany::Many(values)) => values
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Some(OneOrMany::One(value)) => value
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    }
}

/// Normalize image URLs into the canonical sequence, dropping empties
pub fn normalize_images(images: Option<OneOrMany>) -> Vec<String> {
    images
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Coerce a submitted rating to an integer
///
/// Unparseable text is omitted (never an error); a parseable value
/// outside 1-5 is a field-level rejection.
fn coerce_rating(rating: Option<&RatingValue>, details: &mut FieldErrors) -> Option<i64> {
    let parsed = match rating {
        None => return None,
        Some(RatingValue::Int(n)) => Some(*n),
        Some(RatingValue::Float(f)) => Some(*f as i64),
        Some(RatingValue::Text(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
        }
    };
    match parsed {
        Some(n) if (1..=5).contains(&n) => Some(n),
        Some(n) => {
            details.insert(
                "rating".to_string(),
                format!("rating must be between 1 and 5, got {n}"),
            );
            None
        }
        None => None,
    }
}

fn parse_enum_field<T: Default>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    field: &str,
    details: &mut FieldErrors,
) -> T {
    match value {
        None => T::default(),
        Some(raw) => match parse(raw) {
            Some(parsed) => parsed,
            None => {
                details.insert(field.to_string(), format!("`{raw}` is not a valid value"));
                T::default()
            }
        },
    }
}
