//! REST exposure for operational endpoints
//!
//! The storefront's data lives behind GraphQL; REST only carries health
//! checks and whatever custom routes the application merges in.
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.

use super::super::host::ServerHost;
use anyhow::Result;
use axum::{Extension, Json, Router, http::StatusCode, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// Service name reported by the health endpoints
pub const SERVICE_NAME: &str = "storefront-graph";

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing all application state
    /// * `custom_routes` - Additional custom routes to merge
    ///
    /// # Returns
    ///
    /// Returns an Axum router with:
    /// - Health check routes
    /// - Custom routes
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes().layer(Extension(host));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    ///
    /// Answers 503 until the host carries a schema with a Query root.
    async fn health_check(
        Extension(host): Extension<Arc<ServerHost>>,
    ) -> (StatusCode, Json<Value>) {
        let (status, label) = if host.is_ready() {
            (StatusCode::OK, "ok")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        };

        let body = json!({
            "status": label,
            "service": SERVICE_NAME,
            "storage": host.config.storage.backend(),
            "types": host.type_names(),
        });
        (status, Json(body))
    }
}
