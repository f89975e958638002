//! # Storefront Graph
//!
//! A GraphQL query and mutation layer over a relational e-commerce dataset:
//! users, products, orders and order items.
//!
//! ## Features
//!
//! - **Schema Registry**: an explicit table binding every (type, field) pair to a resolver
//! - **Nested Resolution**: order → items → product, with lazy loading when the parent is thin
//! - **Inventory Safety**: order lines are checked and written in one critical section
//! - **Pluggable Storage**: in-memory maps, or SQLite behind the `sqlite` feature
//! - **Configuration-Based**: bind address, backend and inventory policy via YAML or environment
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ServerConfig::from_yaml_file("storefront.yaml")?.with_env_overrides()?;
//!
//!     ServerBuilder::new()
//!         .with_config(config)
//!         .connect_store()
//!         .await?
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod schema;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        ArgValue, Arguments, DomainError, GraphObject, GraphQLError, InventoryPolicy, NewOrder,
        NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product, RecordKind, RequestError,
        ScalarKind, Store, User,
    };

    // === Schema ===
    pub use crate::schema::{Resolver, Schema, storefront_schema};

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteStore;

    // === Config ===
    pub use crate::config::{ServerConfig, StorageConfig};

    // === Server ===
    pub use crate::server::{GraphQLExecutor, GraphQLExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        routing::{get, post},
    };
}
