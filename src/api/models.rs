//! Backend payload types.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One detection run over an image, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: i64,
    /// ISO 8601 timestamp, with or without an offset
    pub timestamp: String,
    pub num_people: u32,
    /// Server-side path of the annotated image
    pub image_path: String,
    pub original_filename: String,
    /// Confidence threshold the detection ran with
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Inference time in seconds
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
    #[serde(default)]
    pub details: Option<Vec<DetectionDetailResult>>,
}

impl DetectionResult {
    /// Image dimensions, only when the backend reported both.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.image_width, self.image_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    pub fn detections(&self) -> &[DetectionDetailResult] {
        self.details.as_deref().unwrap_or(&[])
    }

    /// Timestamp formatted for display, or the raw value if it does not parse.
    pub fn display_timestamp(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// A single bounding box found during a detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionDetailResult {
    pub id: i64,
    pub detection_id: i64,
    pub confidence: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub class_name: String,
    pub class_id: i64,
}

impl DetectionDetailResult {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One page of detection history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationResult {
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    /// Page count as reported by the server
    pub pages: u32,
    pub data: Vec<DetectionResult>,
}

/// JSON body for detection by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlRequest {
    pub image_url: String,
}

fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY).to_string();
    }
    raw.to_string()
}
