//! Storefront GraphQL server
//!
//! This example demonstrates:
//! - Loading configuration from YAML with environment overrides
//! - Opening the configured store (in-memory, or SQLite with `--features sqlite`)
//! - Seeding a small catalogue
//! - Serving `POST /graphql` with graceful shutdown
//!
//! Run with:
//! ```text
//! cargo run --example server
//! STOREFRONT_SQLITE_PATH=data/ecommerce.db cargo run --example server --features sqlite
//! ```

use std::path::Path;
use storefront::prelude::*;
use storefront::storage;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "demos/server/storefront.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront=debug,tower_http=info")),
        )
        .init();

    let config = if Path::new(CONFIG_PATH).exists() {
        ServerConfig::from_yaml_file(CONFIG_PATH)?
    } else {
        ServerConfig::default()
    }
    .with_env_overrides()?;

    let store = storage::connect(&config).await?;
    if store.list_products().await?.is_empty() {
        seed_catalogue(store.as_ref()).await?;
    }

    println!("🚀 Storefront GraphQL server");
    println!("   Storage:   {}", config.storage.backend());
    println!("   Inventory: {:?}", config.inventory_policy);
    println!("\n🌐 Listening on http://{}", config.bind);
    println!("\n📚 Available endpoints:");
    println!("    POST   /graphql    - GraphQL endpoint");
    println!("    GET    /health     - Health check");
    println!("\n  Example query:");
    println!("    query {{ products {{ id name price inventory }} }}");
    println!("\n  Example mutation:");
    println!("    mutation {{");
    println!("      addOrderItem(order_id: 1, product_id: 1, quantity: 2, price: 9.99) {{");
    println!("        id");
    println!("        product {{ name inventory }}");
    println!("      }}");
    println!("    }}");

    ServerBuilder::new()
        .with_config(config)
        .with_shared_store(store)
        .serve()
        .await
}

/// Seed a user, two products and an open order
async fn seed_catalogue(store: &dyn Store) -> Result<()> {
    let user = store
        .create_user(NewUser {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical-engine".to_string(),
        })
        .await?;

    store
        .create_product(NewProduct {
            name: "Widget".to_string(),
            description: Some("A general purpose widget".to_string()),
            price: 9.99,
            inventory: 5,
        })
        .await?;

    store
        .create_product(NewProduct {
            name: "Gadget".to_string(),
            description: None,
            price: 24.5,
            inventory: 12,
        })
        .await?;

    store
        .create_order(NewOrder {
            user_id: user.id,
            status: "pending".to_string(),
            total: 0.0,
        })
        .await?;

    tracing::info!(user_id = user.id, "Seeded demo catalogue");
    Ok(())
}
