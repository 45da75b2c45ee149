//! Integration tests for the travelmap-srv API endpoints
//!
//! Drives the router directly with stubbed external services and an
//! in-memory database.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use travelmap_common::models::Coordinates;
use travelmap_srv::services::{Geocoder, PhotoFinder, PhotoStream, UpstreamError};
use travelmap_srv::{build_router, AppState};

struct StubGeocoder {
    result: Option<Coordinates>,
    calls: AtomicUsize,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, _destination: &str) -> Option<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
    }

    async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Option<String> {
        None
    }
}

struct StubPhotos {
    url: Option<String>,
}

#[async_trait]
impl PhotoFinder for StubPhotos {
    async fn find_photo_url(&self, _location: &str) -> Result<Option<String>, UpstreamError> {
        Ok(self.url.clone())
    }

    async fn fetch_photo(&self, reference: &str) -> Result<PhotoStream, UpstreamError> {
        if reference == "broken" {
            return Err(UpstreamError::Status(500));
        }
        Ok(PhotoStream {
            content_type: "image/png".to_string(),
            data: futures::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(
                b"PNGDATA",
            ))])
            .boxed(),
        })
    }
}

struct TestApp {
    app: axum::Router,
    geocoder: Arc<StubGeocoder>,
    // Held so the uploads directory outlives the test
    uploads: TempDir,
}

async fn setup_app(geocode_result: Option<Coordinates>, photo_url: Option<String>) -> TestApp {
    let db = travelmap_srv::db::init_memory_database()
        .await
        .expect("Should create in-memory database");
    let geocoder = Arc::new(StubGeocoder {
        result: geocode_result,
        calls: AtomicUsize::new(0),
    });
    let photos = Arc::new(StubPhotos { url: photo_url });
    let uploads = TempDir::new().expect("Should create temp uploads dir");

    let state = AppState::new(
        db,
        geocoder.clone(),
        photos,
        uploads.path().to_path_buf(),
    );
    TestApp {
        app: build_router(state),
        geocoder,
        uploads,
    }
}

fn paris() -> Option<Coordinates> {
    Some(Coordinates {
        lat: 48.8566,
        lng: 2.3522,
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let test = setup_app(paris(), None).await;

    let response = test.app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "travelmap-srv");
}

#[tokio::test]
async fn create_persists_and_lists_newest_first() {
    let test = setup_app(paris(), None).await;

    let first = post_json(
        "/api/travel-records",
        json!({
            "name": "Alex",
            "startDate": "2024-06-01",
            "endDate": "2024-06-03",
            "destinationName": "Paris, France",
            "keywordTags": "food, art",
            "uploadedImages": ["/uploads/a.jpg"],
            "rating": "5"
        }),
    );
    let response = test.app.clone().oneshot(first).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["latitude"], json!(48.8566));
    assert_eq!(created["longitude"], json!(2.3522));
    assert_eq!(created["duration"], json!(3));
    assert_eq!(created["keywordTags"], json!(["food", "art"]));
    assert_eq!(created["rating"], json!(5));

    let second = post_json(
        "/api/travel-records",
        json!({
            "name": "Tracy",
            "startDate": "2024-07-01",
            "destinationName": "Paris, France"
        }),
    );
    let response = test.app.clone().oneshot(second).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = test.app.oneshot(get("/api/travel-records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = extract_json(response.into_body()).await;
    let records = listed.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Tracy");
    assert_eq!(records[1]["name"], "Alex");
}

#[tokio::test]
async fn missing_required_fields_rejected_before_geocoding() {
    let test = setup_app(paris(), None).await;

    let request = post_json(
        "/api/travel-records",
        json!({ "name": "Alex", "destinationName": "Paris, France" }),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MISSING_FIELDS");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("startDate"));
    assert_eq!(test.geocoder.calls.load(Ordering::SeqCst), 0);

    let response = test.app.oneshot(get("/api/travel-records")).await.unwrap();
    let listed = extract_json(response.into_body()).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn geocode_failure_names_destination_and_persists_nothing() {
    let test = setup_app(None, None).await;

    let request = post_json(
        "/api/travel-records",
        json!({
            "name": "Alex",
            "startDate": "2024-06-01",
            "destinationName": "Atlantis"
        }),
    );
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "GEOCODE_FAILED");
    assert!(body["error"]["message"].as_str().unwrap().contains("Atlantis"));

    let response = test.app.oneshot(get("/api/travel-records")).await.unwrap();
    let listed = extract_json(response.into_body()).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_rating_returns_field_details() {
    let test = setup_app(paris(), None).await;

    let request = post_json(
        "/api/travel-records",
        json!({
            "name": "Alex",
            "startDate": "2024-06-01",
            "destinationName": "Paris, France",
            "rating": 9
        }),
    );
    let response = test.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["rating"].is_string());
}

#[tokio::test]
async fn markers_endpoint_deduplicates_positions() {
    let test = setup_app(paris(), None).await;

    for name in ["Alex", "Tracy"] {
        let request = post_json(
            "/api/travel-records",
            json!({
                "name": name,
                "startDate": "2024-06-01",
                "destinationName": "Paris, France"
            }),
        );
        let response = test.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = test.app.oneshot(get("/api/markers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let markers = extract_json(response.into_body()).await;
    assert_eq!(markers.as_array().unwrap().len(), 1);
    assert_eq!(markers[0]["lat"], json!(48.8566));
}

#[tokio::test]
async fn image_search_returns_proxy_url_or_404() {
    let found = setup_app(paris(), Some("/api/image-search/photo?ref=abc".to_string())).await;
    let response = found.app.oneshot(get("/api/image-search/Paris")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["imageUrl"], "/api/image-search/photo?ref=abc");

    let empty = setup_app(paris(), None).await;
    let response = empty
        .app
        .oneshot(get("/api/image-search/Nowhere"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn photo_proxy_streams_bytes_with_content_type() {
    let test = setup_app(paris(), None).await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/image-search/photo?ref=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"PNGDATA");

    // Missing reference is the caller's fault
    let response = test
        .app
        .clone()
        .oneshot(get("/api/image-search/photo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Upstream breakage is not
    let response = test
        .app
        .oneshot(get("/api/image-search/photo?ref=broken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn multipart_request(uri: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
    let boundary = "travelmap-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"travelImages\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn uploads_store_images_and_return_urls() {
    let test = setup_app(paris(), None).await;

    let request = multipart_request("/api/uploads", "trip.png", b"fake image bytes");
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    let urls = body["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);
    let url = urls[0].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let stored = test.uploads.path().join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"fake image bytes");
}

#[tokio::test]
async fn uploads_reject_non_image_extensions() {
    let test = setup_app(paris(), None).await;

    let request = multipart_request("/api/uploads", "notes.txt", b"not an image");
    let response = test.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
