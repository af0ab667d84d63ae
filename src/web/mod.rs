//! Web server module.

mod handlers;
mod pages;

use crate::api::{ApiError, DetectionClient, ImageUrlResolver};
use crate::config::ServerConfig;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub client: DetectionClient,
    pub images: ImageUrlResolver,
}

/// Web front end for Detectify.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server talking to the backend named in `config`.
    pub fn new(config: ServerConfig) -> Result<Self, ApiError> {
        let client = DetectionClient::new(&config.api_url, config.request_timeout())?;
        let images = ImageUrlResolver::from_api_url(&config.api_url)?;
        tracing::debug!(
            "Detection API at {}, images served from {}",
            client.base_url(),
            images.origin()
        );

        Ok(Self {
            state: AppState {
                config,
                client,
                images,
            },
        })
    }

    /// Build the router with all routes.
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Pages
            .route("/", get(handlers::handle_upload_page).post(handlers::handle_upload_submit))
            .route("/history", get(handlers::handle_history))
            .route("/detection/{id}", get(handlers::handle_detail))
            // Static assets
            .route("/favicon.ico", get(handlers::handle_favicon))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(self.state.config.max_upload_bytes))
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
