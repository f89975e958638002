//! GraphQL executor module
//!
//! This module contains the executor that runs documents against the
//! storefront schema registry.
//!
//! The executor is split into several sub-modules:
//! - `core`: Main executor orchestration
//! - `validation`: Document validation and execution planning
//! - `query_executor`: Concurrent resolution of query root fields
//! - `mutation_executor`: Serial resolution of mutation root fields
//! - `field_resolver`: Field, list and relation resolution
//! - `utils`: Utility functions

mod core;
mod field_resolver;
mod mutation_executor;
mod query_executor;
mod utils;
mod validation;

pub use self::core::{GraphQLExecutor, GraphQLResponse};
