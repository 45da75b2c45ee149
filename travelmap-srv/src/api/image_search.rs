//! Place photo search and the binary photo proxy

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::ApiResult;
use crate::services::UpstreamError;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    #[serde(rename = "ref")]
    reference: Option<String>,
}

/// GET /api/image-search/photo?ref=...
///
/// Streams the photo behind an upstream reference, preserving the
/// upstream content type.
pub async fn photo_proxy(
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> ApiResult<Response> {
    let reference = query
        .reference
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing photo reference.".to_string()))?;

    let photo = state
        .photos
        .fetch_photo(&reference)
        .await
        .map_err(|e| match e {
            UpstreamError::MissingApiKey => {
                ApiError::BadRequest("Missing photo reference or API key.".to_string())
            }
            other => {
                error!("Image proxy failed: {}", other);
                ApiError::Upstream("Image proxy failed.".to_string())
            }
        })?;

    let response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, photo.content_type)],
        Body::from_stream(photo.data),
    )
        .into_response();
    Ok(response)
}

/// GET /api/image-search/:location_name
///
/// Looks up a representative photo for the location and returns a
/// same-origin proxy URL for it; 404 when nothing was found.
pub async fn search_location(
    State(state): State<AppState>,
    Path(location_name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if location_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Location name is required.".to_string()));
    }

    let image_url = state
        .photos
        .find_photo_url(&location_name)
        .await
        .map_err(|e| {
            error!("Place photo lookup failed: {}", e);
            ApiError::Upstream("Place photo lookup failed.".to_string())
        })?;

    match image_url {
        Some(url) => Ok(Json(json!({ "imageUrl": url }))),
        None => Err(ApiError::NotFound("No photos found.".to_string())),
    }
}
