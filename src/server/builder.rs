//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use crate::config::ServerConfig;
use crate::core::Store;
use crate::schema::storefront_schema;
use crate::storage;
use anyhow::Result;
use axum::Router;
use axum::http::{Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for creating the storefront HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ServerConfig::default())
///     .with_store(InMemoryStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn Store>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            store: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the server configuration
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the store (required unless `connect_store` is used)
    pub fn with_store(mut self, store: impl Store + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a store that is also held elsewhere
    pub fn with_shared_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Open the store described by the configuration
    pub async fn connect_store(mut self) -> Result<Self> {
        self.store = Some(storage::connect(&self.config).await?);
        Ok(self)
    }

    /// Add custom routes to the server
    ///
    /// Use this to add routes next to `/graphql`, such as:
    /// - Webhooks (/webhooks/payments)
    /// - Admin endpoints (/admin/reindex)
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{Router, routing::post};
    ///
    /// let custom_routes = Router::new()
    ///     .route("/webhooks/payments", post(payment_webhook));
    ///
    /// ServerBuilder::new()
    ///     .with_store(InMemoryStore::new())
    ///     .with_custom_routes(custom_routes)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// # Returns
    ///
    /// Returns a `ServerHost` containing the configuration, the store and
    /// the storefront schema.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let store = self.store.take().ok_or_else(|| {
            anyhow::anyhow!("Store is required. Call .with_store() or .connect_store()")
        })?;

        Ok(ServerHost::new(self.config, store, storefront_schema()))
    }

    /// Build the final router
    ///
    /// This generates:
    /// - `POST /graphql`
    /// - Health check routes
    /// - Custom routes
    ///
    /// wrapped in request tracing and CORS layers.
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        build_router(host, custom_routes)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Close the store once the server has stopped
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_config(config)
    ///     .connect_store()
    ///     .await?
    ///     .serve()
    ///     .await?;
    /// ```
    pub async fn serve(mut self) -> Result<()> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let app = build_router(host.clone(), custom_routes)?;

        let addr = host.config.bind.clone();
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        host.store.close().await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge every exposure of `host` and apply the HTTP middleware
fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
    let rest = RestExposure::build_router(host.clone(), custom_routes)?;
    let graphql = GraphQLExposure::build_router(host)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(rest.merge(graphql).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    ))
}


/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
