//! In-process stand-in for the detection backend, used by tests.

use crate::api::{DetectionDetailResult, DetectionResult, ImageUrlRequest, PaginationResult};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the mock backend saw for one detect call.
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub image_url: Option<String>,
    pub confidence: Option<String>,
}

#[derive(Default)]
struct MockState {
    records: Mutex<Vec<DetectionResult>>,
    uploads: Mutex<Vec<ReceivedUpload>>,
    last_query: Mutex<Option<HashMap<String, String>>>,
    hits: AtomicUsize,
}

impl MockState {
    fn insert(&self, filename: &str, num_people: u32, confidence: f64) -> DetectionResult {
        let mut records = self.records.lock().unwrap();
        let id = records.len() as i64 + 1;
        let record = sample_record(id, filename, num_people, confidence);
        records.push(record.clone());
        record
    }
}

/// A running mock backend; `api_url` is its base URL.
pub struct MockBackend {
    pub api_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/api/detection/", get(list_detections))
            .route("/api/detection/{id}", get(get_detection))
            .route("/api/detection/detect", post(detect))
            .route("/api/detection/detect-from-url", post(detect_from_url))
            .with_state(state.clone());

        let addr = serve(router).await;
        Self {
            api_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Add `count` records named `photo_01.jpg`, `photo_02.jpg`, ...
    pub fn seed(&self, count: usize) {
        for i in 1..=count {
            self.state
                .insert(&format!("photo_{:02}.jpg", i), (i % 4) as u32, 0.5);
        }
    }

    /// Number of requests the backend has answered.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_query.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }
}

/// Serve a router on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn sample_record(id: i64, filename: &str, num_people: u32, confidence: f64) -> DetectionResult {
    let details = (0..num_people)
        .map(|n| {
            let x = 20.0 + 120.0 * n as f64;
            DetectionDetailResult {
                id: id * 100 + n as i64,
                detection_id: id,
                confidence: 0.9 - 0.1 * n as f64,
                x1: x,
                y1: 40.0,
                x2: x + 80.0,
                y2: 240.0,
                class_name: "person".to_string(),
                class_id: 0,
            }
        })
        .collect();

    DetectionResult {
        id,
        timestamp: format!("2025-03-01T10:{:02}:00.250000", id % 60),
        num_people,
        image_path: format!("/app/static/images/result_{}", filename),
        original_filename: filename.to_string(),
        confidence: Some(confidence),
        processing_time: Some(0.42),
        image_width: Some(640),
        image_height: Some(480),
        details: Some(details),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn list_detections(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = Some(query.clone());

    let number = |key: &str| query.get(key).and_then(|v| v.parse::<u32>().ok());
    let page = number("page").unwrap_or(1).max(1);
    let limit = number("limit").unwrap_or(10).clamp(1, 100);
    let min_people = number("min_people");
    let max_people = number("max_people");
    let search = query.get("search").map(|s| s.to_lowercase());

    let records = state.records.lock().unwrap();
    let mut matching: Vec<DetectionResult> = records
        .iter()
        .filter(|r| min_people.map_or(true, |m| r.num_people >= m))
        .filter(|r| max_people.map_or(true, |m| r.num_people <= m))
        .filter(|r| {
            search
                .as_ref()
                .map_or(true, |s| r.original_filename.to_lowercase().contains(s))
        })
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.id.cmp(&a.id));

    let total = matching.len() as u64;
    let pages = ((total + limit as u64 - 1) / limit as u64) as u32;
    let data = matching
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();

    Json(PaginationResult {
        total,
        page,
        limit,
        pages,
        data,
    })
    .into_response()
}

async fn get_detection(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let records = state.records.lock().unwrap();
    match records.iter().find(|r| r.id == id) {
        Some(record) => Json(record.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Detection not found"),
    }
}

async fn detect(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let mut received = ReceivedUpload {
        confidence: query.get("confidence").cloned(),
        ..Default::default()
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            received.filename = field.file_name().map(str::to_string);
            received.content_type = field.content_type().map(str::to_string);
            received.size = field.bytes().await.unwrap().len();
        }
    }
    state.uploads.lock().unwrap().push(received.clone());

    let Some(filename) = received.filename else {
        return detail(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    if !received
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"))
    {
        return detail(StatusCode::BAD_REQUEST, "Invalid file type");
    }

    let confidence = received
        .confidence
        .as_deref()
        .and_then(|c| c.parse().ok())
        .unwrap_or(0.5);
    let people = (received.size % 5) as u32;
    Json(state.insert(&filename, people, confidence)).into_response()
}

async fn detect_from_url(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<ImageUrlRequest>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.uploads.lock().unwrap().push(ReceivedUpload {
        image_url: Some(body.image_url.clone()),
        confidence: query.get("confidence").cloned(),
        ..Default::default()
    });

    if !body.image_url.starts_with("http") {
        return detail(StatusCode::BAD_REQUEST, "Failed to download image from URL");
    }

    let filename = body
        .image_url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    Json(state.insert(&filename, 3, 0.5)).into_response()
}
