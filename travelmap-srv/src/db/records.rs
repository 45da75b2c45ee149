//! Travel record persistence

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use travelmap_common::models::{BudgetStyle, CompanionType, TravelRecord};
use uuid::Uuid;

/// Append a record. The caller assembles the full record (including the
/// store-assigned id and timestamps) so the value returned to the client
/// matches what was written.
pub async fn insert(pool: &SqlitePool, record: &TravelRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO travel_records (
            id, name, start_date, end_date, destination_name,
            latitude, longitude, accommodation, rating, highlights,
            companion_type, budget_style, memorable_food,
            deepest_impression_spot, travel_tips, keyword_tags,
            daily_brief_itinerary, uploaded_images, duration,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.name)
    .bind(&record.start_date)
    .bind(&record.end_date)
    .bind(&record.destination_name)
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(&record.accommodation)
    .bind(record.rating)
    .bind(&record.highlights)
    .bind(record.companion_type.as_str())
    .bind(record.budget_style.as_str())
    .bind(&record.memorable_food)
    .bind(&record.deepest_impression_spot)
    .bind(&record.travel_tips)
    .bind(serde_json::to_string(&record.keyword_tags)?)
    .bind(&record.daily_brief_itinerary)
    .bind(serde_json::to_string(&record.uploaded_images)?)
    .bind(record.duration)
    // Fixed-width timestamps keep ORDER BY created_at lexicographic
    .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(record.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(pool)
    .await
    .context("Failed to insert travel record")?;

    Ok(())
}

/// All records, newest created first (insertion order breaks ties)
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TravelRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, start_date, end_date, destination_name,
               latitude, longitude, accommodation, rating, highlights,
               companion_type, budget_style, memorable_food,
               deepest_impression_spot, travel_tips, keyword_tags,
               daily_brief_itinerary, uploaded_images, duration,
               created_at, updated_at
        FROM travel_records
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to load travel records")?;

    rows.iter().map(record_from_row).collect()
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TravelRecord> {
    let id_str: String = row.get("id");
    let companion_str: String = row.get("companion_type");
    let budget_str: String = row.get("budget_style");
    let tags_json: String = row.get("keyword_tags");
    let images_json: String = row.get("uploaded_images");

    Ok(TravelRecord {
        id: Uuid::parse_str(&id_str)?,
        name: row.get("name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        destination_name: row.get("destination_name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        accommodation: row.get("accommodation"),
        rating: row.get("rating"),
        highlights: row.get("highlights"),
        companion_type: CompanionType::parse(&companion_str).unwrap_or_default(),
        budget_style: BudgetStyle::parse(&budget_str).unwrap_or_default(),
        memorable_food: row.get("memorable_food"),
        deepest_impression_spot: row.get("deepest_impression_spot"),
        travel_tips: row.get("travel_tips"),
        keyword_tags: serde_json::from_str(&tags_json)?,
        daily_brief_itinerary: row.get("daily_brief_itinerary"),
        uploaded_images: serde_json::from_str(&images_json)?,
        duration: row.get("duration"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: {value}"))?
        .with_timezone(&Utc))
}
