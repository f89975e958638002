//! Server module for building the storefront HTTP server
//!
//! This module provides a `ServerBuilder` that assembles:
//! - The transport-agnostic `ServerHost` (config, store, schema)
//! - The GraphQL endpoint and health check routes
//! - Request tracing and CORS middleware

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::{GraphQLExecutor, GraphQLExposure, GraphQLResponse, RestExposure};
pub use host::ServerHost;
