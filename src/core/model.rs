//! Domain records of the storefront and their relationships

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Format used when exposing `created_at` (matches SQLite's `CURRENT_TIMESTAMP`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The four record kinds held by the persistence gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Product,
    Order,
    OrderItem,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Product => "product",
            RecordKind::Order => "order",
            RecordKind::OrderItem => "order item",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Opaque credential. Stored, never projected onto the GraphQL surface.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// A sellable item with a stock level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub inventory: i64,
    pub created_at: DateTime<Utc>,
}

/// A customer order
///
/// `items` is `None` when the order was read through the thin "list all"
/// path; the relationship resolver loads them on demand in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price captured at purchase time
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub inventory: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub status: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

fn timestamp(at: &DateTime<Utc>) -> Value {
    json!(at.format(TIMESTAMP_FORMAT).to_string())
}

/// A resolved object flowing through the executor as a parent value
#[derive(Debug, Clone, PartialEq)]
pub enum GraphObject {
    User(User),
    Product(Product),
    Order(Order),
    OrderItem(OrderItem),
}

impl GraphObject {
    /// Name of the schema object type this value belongs to
    pub fn type_name(&self) -> &'static str {
        match self {
            GraphObject::User(_) => "User",
            GraphObject::Product(_) => "Product",
            GraphObject::Order(_) => "Order",
            GraphObject::OrderItem(_) => "OrderItem",
        }
    }

    /// Project a scalar column off the record
    ///
    /// Returns `None` for names that are not scalar columns of this kind,
    /// including relationship fields and the user's password.
    pub fn scalar(&self, field: &str) -> Option<Value> {
        match self {
            GraphObject::User(user) => match field {
                "id" => Some(json!(user.id)),
                "name" => Some(json!(user.name)),
                "email" => Some(json!(user.email)),
                "created_at" => Some(timestamp(&user.created_at)),
                _ => None,
            },
            GraphObject::Product(product) => match field {
                "id" => Some(json!(product.id)),
                "name" => Some(json!(product.name)),
                "description" => Some(json!(product.description)),
                "price" => Some(json!(product.price)),
                "inventory" => Some(json!(product.inventory)),
                "created_at" => Some(timestamp(&product.created_at)),
                _ => None,
            },
            GraphObject::Order(order) => match field {
                "id" => Some(json!(order.id)),
                "user_id" => Some(json!(order.user_id)),
                "status" => Some(json!(order.status)),
                "total" => Some(json!(order.total)),
                "created_at" => Some(timestamp(&order.created_at)),
                _ => None,
            },
            GraphObject::OrderItem(item) => match field {
                "id" => Some(json!(item.id)),
                "order_id" => Some(json!(item.order_id)),
                "product_id" => Some(json!(item.product_id)),
                "quantity" => Some(json!(item.quantity)),
                "price" => Some(json!(item.price)),
                _ => None,
            },
        }
    }
}

impl From<User> for GraphObject {
    fn from(user: User) -> Self {
        GraphObject::User(user)
    }
}

impl From<Product> for GraphObject {
    fn from(product: Product) -> Self {
        GraphObject::Product(product)
    }
}

impl From<Order> for GraphObject {
    fn from(order: Order) -> Self {
        GraphObject::Order(order)
    }
}

impl From<OrderItem> for GraphObject {
    fn from(item: OrderItem) -> Self {
        GraphObject::OrderItem(item)
    }
}
