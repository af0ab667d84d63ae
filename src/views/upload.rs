//! Image upload form.

use crate::api::{ApiError, DetectionClient, DetectionResult, ImageUpload, DEFAULT_CONFIDENCE};

use std::fmt;
use thiserror::Error;

pub const UPLOAD_ERROR: &str = "Failed to process the image. Please try again.";

/// Where the image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    #[default]
    File,
    Url,
}

impl UploadMode {
    /// Parse a form value; anything but `url` means file mode.
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("url") {
            UploadMode::Url
        } else {
            UploadMode::File
        }
    }
}

/// Detection confidence threshold on the 0.05 grid within [0.05, 0.95].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confidence {
    steps: u8,
}

impl Confidence {
    pub const STEP: f64 = 0.05;
    const MIN_STEPS: u8 = 1;
    const MAX_STEPS: u8 = 19;

    /// Snap `value` to the nearest selectable threshold.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let steps = (value / Self::STEP)
            .round()
            .clamp(Self::MIN_STEPS as f64, Self::MAX_STEPS as f64) as u8;
        Self { steps }
    }

    pub fn value(&self) -> f64 {
        self.steps as f64 / 20.0
    }

    pub fn min() -> Self {
        Self {
            steps: Self::MIN_STEPS,
        }
    }

    pub fn max() -> Self {
        Self {
            steps: Self::MAX_STEPS,
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value())
    }
}

/// Why a submit was refused before any request was made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejected {
    #[error("Please select an image first")]
    MissingFile,
    #[error("Please enter an image URL")]
    MissingUrl,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Submitting,
    Success(DetectionResult),
    Failed(String),
}

/// A validated upload ready to send.
#[derive(Debug, Clone)]
pub enum UploadRequest {
    File { upload: ImageUpload, confidence: f64 },
    Url { image_url: String, confidence: f64 },
}

impl UploadRequest {
    pub async fn send(self, client: &DetectionClient) -> Result<DetectionResult, ApiError> {
        match self {
            UploadRequest::File { upload, confidence } => {
                client.upload_image(upload, confidence).await
            }
            UploadRequest::Url {
                image_url,
                confidence,
            } => client.upload_image_from_url(&image_url, confidence).await,
        }
    }
}

/// State of the upload form.
#[derive(Debug, Default)]
pub struct UploadView {
    mode: UploadMode,
    file: Option<ImageUpload>,
    image_url: String,
    confidence: Confidence,
    status: UploadStatus,
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    /// Switch tabs without touching inputs.
    pub fn set_mode(&mut self, mode: UploadMode) {
        self.mode = mode;
    }

    /// Pick a file; clears the URL input and any previous outcome.
    pub fn select_file(&mut self, file: ImageUpload) {
        self.file = Some(file);
        self.image_url.clear();
        self.status = UploadStatus::Idle;
        self.mode = UploadMode::File;
    }

    /// Enter a URL; clears the selected file and any previous outcome.
    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.image_url = url.into();
        self.file = None;
        self.status = UploadStatus::Idle;
        self.mode = UploadMode::Url;
    }

    pub fn set_confidence(&mut self, value: f64) {
        self.confidence = Confidence::new(value);
    }

    /// Validate inputs and move to `Submitting`.
    ///
    /// Missing input leaves the view `Failed` and nothing must be sent.
    pub fn begin_submit(&mut self) -> Result<UploadRequest, UploadRejected> {
        let confidence = self.confidence.value();
        let request = match self.mode {
            UploadMode::File => match &self.file {
                Some(upload) => Ok(UploadRequest::File {
                    upload: upload.clone(),
                    confidence,
                }),
                None => Err(UploadRejected::MissingFile),
            },
            UploadMode::Url => {
                let url = self.image_url.trim();
                if url.is_empty() {
                    Err(UploadRejected::MissingUrl)
                } else {
                    Ok(UploadRequest::Url {
                        image_url: url.to_string(),
                        confidence,
                    })
                }
            }
        };

        self.status = match &request {
            Ok(_) => UploadStatus::Submitting,
            Err(rejected) => UploadStatus::Failed(rejected.to_string()),
        };
        request
    }

    /// Record the outcome of a submitted request.
    pub fn complete(&mut self, outcome: Result<DetectionResult, ApiError>) {
        self.status = match outcome {
            Ok(result) => UploadStatus::Success(result),
            Err(e) => {
                tracing::warn!("Error processing image: {}", e);
                UploadStatus::Failed(e.detail().unwrap_or(UPLOAD_ERROR).to_string())
            }
        };
    }

    /// Fail without a request, e.g. when the form itself could not be read.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Failed(message.into());
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match &self.status {
            UploadStatus::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}
