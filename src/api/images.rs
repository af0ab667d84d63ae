//! Display URLs for images stored by the backend.

use super::ApiError;
use url::Url;

/// Path prefix under which the backend serves static files.
pub const STATIC_PREFIX: &str = "/static";

const IMAGES_SEGMENT: &str = "/images";

/// Maps stored image paths to URLs on the backend's static file root.
///
/// Stored paths are either already public (`/static/images/x.jpg`) or
/// filesystem paths on the backend host (`/app/static/images/x.jpg`). The
/// latter are rebuilt from the first `/images` segment onwards.
#[derive(Debug, Clone)]
pub struct ImageUrlResolver {
    origin: String,
}

impl ImageUrlResolver {
    /// Build a resolver from the API base URL; only its origin is used.
    pub fn from_api_url(api_url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(api_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL {}: {}", api_url, e)))?;
        if !url.has_host() {
            return Err(ApiError::Config(format!("API URL has no host: {}", api_url)));
        }

        Ok(Self {
            origin: url.origin().ascii_serialization(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a stored image path. Returns `None` for an empty path.
    pub fn resolve(&self, image_path: &str) -> Option<String> {
        if image_path.is_empty() {
            return None;
        }

        if image_path.starts_with(STATIC_PREFIX) {
            return Some(format!("{}{}", self.origin, image_path));
        }

        match image_path.find(IMAGES_SEGMENT) {
            Some(idx) => Some(format!("{}{}{}", self.origin, STATIC_PREFIX, &image_path[idx..])),
            None => Some(format!(
                "{}{}/{}",
                self.origin,
                STATIC_PREFIX,
                image_path.trim_start_matches('/')
            )),
        }
    }
}
