//! SQLite storage backend using sqlx.
//!
//! Provides [`SqliteStore`], a [`Store`] backed by a `sqlx::SqlitePool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `sqlite` feature flag:
//! ```toml
//! [dependencies]
//! storefront-graph = { version = "0.1", features = ["sqlite"] }
//! ```
//!
//! # Schema
//!
//! Four tables keyed by `INTEGER PRIMARY KEY AUTOINCREMENT` ids, with foreign
//! keys order_items→orders, order_items→products and orders→users.
//! `created_at` is written by the store as RFC 3339 text.

use crate::core::error::{DomainError, Result};
use crate::core::model::{
    NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product, RecordKind, User,
};
use crate::core::store::{InventoryPolicy, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Create the four tables if they do not exist yet.
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL,
            inventory INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            total REAL NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS order_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL NOT NULL,
            FOREIGN KEY (order_id) REFERENCES orders (id),
            FOREIGN KEY (product_id) REFERENCES products (id)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

type UserRow = (i64, String, String, String, DateTime<Utc>);
type ProductRow = (i64, String, Option<String>, f64, i64, DateTime<Utc>);
type OrderRow = (i64, i64, String, f64, DateTime<Utc>);
type OrderItemRow = (
    i64,
    i64,
    i64,
    i64,
    f64,
    i64,
    String,
    Option<String>,
    f64,
    i64,
    DateTime<Utc>,
);

const USER_COLUMNS: &str = "id, name, email, password, created_at";
const PRODUCT_COLUMNS: &str = "id, name, description, price, inventory, created_at";
const ORDER_COLUMNS: &str = "id, user_id, status, total, created_at";
const ORDER_ITEM_SELECT: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price, \
     p.id, p.name, p.description, p.price, p.inventory, p.created_at \
     FROM order_items oi JOIN products p ON p.id = oi.product_id";

fn user_from_row((id, name, email, password, created_at): UserRow) -> User {
    User {
        id,
        name,
        email,
        password,
        created_at,
    }
}

fn product_from_row((id, name, description, price, inventory, created_at): ProductRow) -> Product {
    Product {
        id,
        name,
        description,
        price,
        inventory,
        created_at,
    }
}

fn order_from_row((id, user_id, status, total, created_at): OrderRow) -> Order {
    Order {
        id,
        user_id,
        status,
        total,
        created_at,
        items: None,
    }
}

fn order_item_from_row(row: OrderItemRow) -> OrderItem {
    let (
        id,
        order_id,
        product_id,
        quantity,
        price,
        pid,
        name,
        description,
        pprice,
        inventory,
        created_at,
    ) = row;
    OrderItem {
        id,
        order_id,
        product_id,
        quantity,
        price,
        product: Some(product_from_row((
            pid,
            name,
            description,
            pprice,
            inventory,
            created_at,
        ))),
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// How long a connection waits on a lock held by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store backed by SQLite.
///
/// Every write takes an in-process mutex, so a pooled connection never has
/// to upgrade a read transaction while another connection holds the write
/// lock. Order-line creation runs inside a transaction and the inventory
/// decrement is conditional (`inventory >= ?`), so two writers can never both
/// pass the availability check.
///
/// # Example
///
/// ```rust,ignore
/// use storefront::storage::SqliteStore;
///
/// let store = SqliteStore::connect("data/ecommerce.db", InventoryPolicy::Reserve).await?;
/// let user = store.create_user(new_user).await?;
/// ```
pub struct SqliteStore {
    pool: SqlitePool,
    inventory_policy: InventoryPolicy,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path` and apply the schema
    pub async fn connect(path: &str, inventory_policy: InventoryPolicy) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!(path, "Connected to SQLite database");
        Self::from_pool(pool, inventory_policy).await
    }

    /// Open a private in-memory database
    ///
    /// The pool is pinned to one connection that never expires, since every
    /// SQLite in-memory connection is a separate database.
    pub async fn in_memory(inventory_policy: InventoryPolicy) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool, inventory_policy).await
    }

    /// Wrap an existing pool, applying the schema first
    pub async fn from_pool(pool: SqlitePool, inventory_policy: InventoryPolicy) -> Result<Self> {
        ensure_schema(&pool).await?;
        Ok(Self {
            pool,
            inventory_policy,
            write_lock: Mutex::new(()),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_user_exists(&self, id: i64) -> Result<()> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        found
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(RecordKind::User, id))
    }

    async fn get_order_item(&self, id: i64) -> Result<OrderItem> {
        let sql = format!("{} WHERE oi.id = ?", ORDER_ITEM_SELECT);
        let row = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(order_item_from_row)
            .ok_or_else(|| DomainError::not_found(RecordKind::OrderItem, id))
    }

    async fn with_items(&self, mut order: Order) -> Result<Order> {
        order.items = Some(self.get_order_items_for_order(order.id).await?);
        Ok(order)
    }
}

fn insert_user_error(err: sqlx::Error, email: &str) -> DomainError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return DomainError::duplicate_email(email);
    }
    err.into()
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_user(&self, id: i64) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row)
            .ok_or_else(|| DomainError::not_found(RecordKind::User, id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(user_from_row).collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| insert_user_error(e, &user.email))?;

        self.get_user(result.last_insert_rowid()).await
    }

    async fn get_product(&self, id: i64) -> Result<Product> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(product_from_row)
            .ok_or_else(|| DomainError::not_found(RecordKind::Product, id))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(product_from_row).collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(
            "INSERT INTO products (name, description, price, inventory, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.inventory)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_product(result.last_insert_rowid()).await
    }

    async fn get_order(&self, id: i64) -> Result<Order> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let order = row
            .map(order_from_row)
            .ok_or_else(|| DomainError::not_found(RecordKind::Order, id))?;
        self.with_items(order).await
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY id",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.with_items(order_from_row(row)).await?);
        }
        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let sql = format!("SELECT {} FROM orders ORDER BY id", ORDER_COLUMNS);
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(order_from_row).collect())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        self.ensure_user_exists(order.user_id).await?;

        let result = sqlx::query(
            "INSERT INTO orders (user_id, status, total, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(order.user_id)
        .bind(&order.status)
        .bind(order.total)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_order(result.last_insert_rowid()).await
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(RecordKind::Order, id));
        }

        self.get_order(id).await
    }

    async fn get_order_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let sql = format!("{} WHERE oi.order_id = ? ORDER BY oi.id", ORDER_ITEM_SELECT);
        let rows = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(order_item_from_row).collect())
    }

    async fn add_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let order: Option<(i64,)> = sqlx::query_as("SELECT id FROM orders WHERE id = ?")
            .bind(item.order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Err(DomainError::not_found(RecordKind::Order, item.order_id));
        }

        let stock: Option<(i64,)> = sqlx::query_as("SELECT inventory FROM products WHERE id = ?")
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;
        let (available,) =
            stock.ok_or_else(|| DomainError::not_found(RecordKind::Product, item.product_id))?;

        let insufficient = DomainError::InsufficientInventory {
            product_id: item.product_id,
            requested: item.quantity,
            available,
        };
        if item.quantity > available {
            return Err(insufficient);
        }

        if self.inventory_policy == InventoryPolicy::Reserve {
            let reserved = sqlx::query(
                "UPDATE products SET inventory = inventory - ? WHERE id = ? AND inventory >= ?",
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if reserved.rows_affected() == 0 {
                return Err(insufficient);
            }
        }

        let inserted = sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_order_item(inserted.last_insert_rowid()).await
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
