//! HTTP client for the detection endpoints.

use super::{ApiError, DetectionResult, ImageUrlRequest, PaginationResult};

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use url::Url;

/// Confidence threshold used when the caller has no preference.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// An image file to upload, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Content type guessed from the file extension.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// Filters and paging for a history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionQuery {
    pub page: u32,
    pub limit: u32,
    pub min_people: Option<u32>,
    pub max_people: Option<u32>,
    /// Filename substring; matching rules belong to the server
    pub search: Option<String>,
}

impl Default for DetectionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            min_people: None,
            max_people: None,
            search: None,
        }
    }
}

impl DetectionQuery {
    /// Query parameters, leaving out unset filters and empty searches.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];

        if let Some(min) = self.min_people {
            params.push(("min_people", min.to_string()));
        }
        if let Some(max) = self.max_people {
            params.push(("max_people", max.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }

        params
    }
}

/// Client for the detection REST backend.
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    base_url: String,
}

impl DetectionClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "unsupported API URL scheme: {}",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run detection on an uploaded file.
    pub async fn upload_image(
        &self,
        upload: ImageUpload,
        confidence: f64,
    ) -> Result<DetectionResult, ApiError> {
        let content_type = upload.content_type();
        let filename = upload.filename.clone();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&content_type)
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let form = Form::new().part("file", part);

        let start = Instant::now();
        let response = self
            .http
            .post(self.endpoint("/detection/detect"))
            .query(&[("confidence", confidence)])
            .multipart(form)
            .send()
            .await?;

        let result: DetectionResult = decode(response).await?;
        tracing::info!(
            "Detected {} people in {} (id {}, {:?})",
            result.num_people,
            filename,
            result.id,
            start.elapsed()
        );
        Ok(result)
    }

    /// Run detection on an image the backend downloads itself.
    pub async fn upload_image_from_url(
        &self,
        image_url: &str,
        confidence: f64,
    ) -> Result<DetectionResult, ApiError> {
        let body = ImageUrlRequest {
            image_url: image_url.to_string(),
        };

        let start = Instant::now();
        let response = self
            .http
            .post(self.endpoint("/detection/detect-from-url"))
            .query(&[("confidence", confidence)])
            .json(&body)
            .send()
            .await?;

        let result: DetectionResult = decode(response).await?;
        tracing::info!(
            "Detected {} people in {} (id {}, {:?})",
            result.num_people,
            image_url,
            result.id,
            start.elapsed()
        );
        Ok(result)
    }

    /// Fetch one page of detection history.
    pub async fn get_detections(&self, query: &DetectionQuery) -> Result<PaginationResult, ApiError> {
        let response = self
            .http
            .get(self.endpoint("/detection/"))
            .query(&query.params())
            .send()
            .await?;

        let page: PaginationResult = decode(response).await?;
        tracing::debug!(
            "Fetched page {}/{} ({} of {} records)",
            page.page,
            page.pages,
            page.data.len(),
            page.total
        );
        Ok(page)
    }

    /// Fetch a single detection. A missing record is `ApiError::NotFound`.
    pub async fn get_detection_by_id(&self, id: i64) -> Result<DetectionResult, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/detection/{}", id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }

        decode(response).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull a string `detail` out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.as_str().map(str::to_string))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status,
            detail: extract_detail(&body),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
