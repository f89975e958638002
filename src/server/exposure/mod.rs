//! API Exposure modules for different protocols
//!
//! Each exposure type consumes a `ServerHost` and produces a Router for that protocol.

pub mod graphql;
pub mod rest;

// Re-export for convenience
pub use graphql::{GraphQLExecutor, GraphQLExposure, GraphQLResponse};
pub use rest::RestExposure;
