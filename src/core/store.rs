//! The persistence gateway
//!
//! [`Store`] is the only way resolvers touch records. Implementations own the
//! uniqueness and foreign-key invariants and must make the inventory check of
//! [`Store::add_order_item`] atomic with its write.

use crate::core::error::Result;
use crate::core::model::{
    NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product, User,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Whether a successful order line consumes product inventory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryPolicy {
    /// Decrement `product.inventory` by the ordered quantity
    #[default]
    Reserve,
    /// Only check availability, never touch the stored inventory
    CheckOnly,
}

/// CRUD access to users, products, orders and order items
///
/// Reads of a missing record fail with `DomainError::NotFound`; backend
/// failures surface as `DomainError::Storage` and are never retried.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a user by id
    async fn get_user(&self, id: i64) -> Result<User>;

    /// List all users in storage order
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Create a user; a duplicate email fails with `Conflict`
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_product(&self, id: i64) -> Result<Product>;

    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Get an order with its items (and their products) populated
    async fn get_order(&self, id: i64) -> Result<Order>;

    /// List a user's orders, each with items populated
    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>>;

    /// List every order without items
    ///
    /// This is a thinner read than [`Store::get_order`]: `items` stays `None`
    /// and is loaded by the relationship resolver when selected.
    async fn list_all_orders(&self) -> Result<Vec<Order>>;

    /// Create an order for an existing user
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    /// Overwrite an order's status and return the re-read order
    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order>;

    /// Items of an order in insertion order, each with its product
    async fn get_order_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>>;

    /// Add a line to an order
    ///
    /// Fails with `InsufficientInventory` when `quantity` exceeds the
    /// product's inventory; the check and the write form one critical
    /// section so concurrent calls cannot over-commit.
    async fn add_order_item(&self, item: NewOrderItem) -> Result<OrderItem>;

    /// Release backend resources at shutdown
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
