//! Configuration module for Detectify.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Base URL of the detection backend when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web front end (default: 3000)
    pub http_port: u16,
    /// Base URL of the detection REST API (default: "http://localhost:8000/api")
    pub api_url: String,
    /// Backend request timeout in seconds (default: 30.0)
    pub request_timeout: f64,
    /// Rows per history page (default: 10)
    pub page_size: u32,
    /// Largest accepted upload body in bytes (default: 10 MiB)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 3000,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: 30.0,
            page_size: 10,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DETECTIFY_HTTP_PORT`: HTTP port (default: 3000)
    /// - `DETECTIFY_API_URL`: detection API base URL (default: "http://localhost:8000/api")
    /// - `DETECTIFY_REQUEST_TIMEOUT`: backend timeout in seconds (default: 30.0)
    /// - `DETECTIFY_PAGE_SIZE`: history rows per page, 1..=100 (default: 10)
    /// - `DETECTIFY_MAX_UPLOAD_BYTES`: upload body limit (default: 10 MiB)
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(port) = lookup("DETECTIFY_HTTP_PORT").and_then(|s| s.parse().ok()) {
            cfg.http_port = port;
        }

        if let Some(api_url) = lookup("DETECTIFY_API_URL") {
            if !api_url.trim().is_empty() {
                cfg.api_url = api_url.trim().to_string();
            }
        }

        if let Some(timeout) = lookup("DETECTIFY_REQUEST_TIMEOUT").and_then(|s| s.parse::<f64>().ok()) {
            if timeout > 0.0 && timeout.is_finite() {
                cfg.request_timeout = timeout;
            }
        }

        if let Some(size) = lookup("DETECTIFY_PAGE_SIZE").and_then(|s| s.parse::<u32>().ok()) {
            if (1..=100).contains(&size) {
                cfg.page_size = size;
            }
        }

        if let Some(limit) = lookup("DETECTIFY_MAX_UPLOAD_BYTES").and_then(|s| s.parse().ok()) {
            cfg.max_upload_bytes = limit;
        }

        cfg
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout)
    }
}
