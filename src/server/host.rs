//! Server host for transport-agnostic API exposure
//!
//! This module provides a `ServerHost` structure that contains all state
//! needed to expose the storefront via any protocol (GraphQL, REST health
//! checks, custom routes).
//!
//! The host is agnostic to the transport protocol and serves as the single
//! source of truth for the application state.

use crate::config::ServerConfig;
use crate::core::Store;
use crate::schema::Schema;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(config, store, storefront_schema());
///
/// // Use host with any exposure
/// let host_arc = Arc::new(host);
/// let rest_app = RestExposure::build_router(host_arc.clone(), vec![])?;
/// let graphql_app = GraphQLExposure::build_router(host_arc)?;
/// ```
pub struct ServerHost {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Persistence gateway, opened once at startup and shared by all requests
    pub store: Arc<dyn Store>,

    /// Type registry the executor validates and resolves against
    pub schema: Arc<Schema>,
}

impl ServerHost {
    /// Build the host from its components
    pub fn new(config: ServerConfig, store: Arc<dyn Store>, schema: Schema) -> Self {
        Self {
            config: Arc::new(config),
            store,
            schema: Arc::new(schema),
        }
    }

    /// Names of the object types exposed by the schema
    pub fn type_names(&self) -> Vec<&str> {
        self.schema.types().map(|object| object.name.as_str()).collect()
    }

    /// Check if host is properly initialized
    pub fn is_ready(&self) -> bool {
        self.schema.query_type().is_some()
    }
}
