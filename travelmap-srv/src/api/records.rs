//! Travel record endpoints

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;
use travelmap_common::map::marker::{unique_markers, Marker};
use travelmap_common::models::{RecordSubmission, TravelRecord};

use crate::error::ApiResult;
use crate::{db, ingest, ApiError, AppState};

/// GET /api/travel-records
///
/// All records, newest created first.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<TravelRecord>>> {
    let records = db::records::list_all(&state.db).await.map_err(|e| {
        error!("Failed to list travel records: {:#}", e);
        ApiError::Internal("Failed to load travel records".to_string())
    })?;
    Ok(Json(records))
}

/// POST /api/travel-records
///
/// Validates, geocodes, and persists a submission. 400 with a message
/// naming the destination on geocode failure, 400 with a field-detail
/// map on validation failure.
pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordSubmission>,
) -> ApiResult<(StatusCode, Json<TravelRecord>)> {
    let record = ingest::submit(&state.db, state.geocoder.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/markers
///
/// Deduplicated map positions for the full record set, first-seen order.
pub async fn list_markers(State(state): State<AppState>) -> ApiResult<Json<Vec<Marker>>> {
    let records = db::records::list_all(&state.db).await.map_err(|e| {
        error!("Failed to load records for markers: {:#}", e);
        ApiError::Internal("Failed to load travel records".to_string())
    })?;
    Ok(Json(unique_markers(&records)))
}
