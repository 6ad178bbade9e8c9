//! Listing creation endpoint.
//!
//! - `POST /api/properties` create a listing (201, or 400/401 with a message)
//! - `GET /api/properties?purpose=&all=` visible listings, newest first
//! - `GET /api/properties/{slug}` one listing or 404
//! - `GET /health`

pub mod error;
pub mod routes;

pub use error::{ServerError, ServerResult};
pub use routes::AppState;

use crate::config::ServerConfig;
use crate::store::ListingCollection;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ListingServer {
    config: ServerConfig,
    router: Router,
}

impl ListingServer {
    pub fn new(config: ServerConfig, collection: ListingCollection) -> Self {
        let state = Arc::new(AppState {
            collection,
            admin_password: config.admin_password.clone(),
        });
        let router = Router::new()
            .merge(routes::health_routes())
            .merge(routes::listing_routes(state))
            .layer(TraceLayer::new_for_http());
        Self { config, router }
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve on an already bound listener
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router).await
    }

    /// Bind the configured address and serve until the process stops
    pub async fn start(self) -> Result<()> {
        let addr = self.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("🏠 Listing endpoint on http://{}", addr);
        info!("Health check: http://{}/health", addr);
        if self.config.admin_password.is_none() {
            info!("No admin password configured, create requests are not checked");
        }

        self.run(listener).await.context("Server error")
    }
}
