//! In-memory implementation of the persistence gateway

use crate::core::error::{DomainError, Result};
use crate::core::model::{
    NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product, RecordKind, User,
};
use crate::core::store::{InventoryPolicy, Store};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Auto-incremented tables, keyed by id so iteration follows insertion order
#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    last_user_id: i64,
    last_product_id: i64,
    last_order_id: i64,
    last_order_item_id: i64,
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

impl Tables {
    fn product(&self, id: i64) -> Result<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| DomainError::not_found(RecordKind::Product, id))
    }

    fn items_of(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        self.order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .map(|item| {
                let mut item = item.clone();
                item.product = Some(self.product(item.product_id)?.clone());
                Ok(item)
            })
            .collect()
    }

    fn order_with_items(&self, order: &Order) -> Result<Order> {
        let mut order = order.clone();
        order.items = Some(self.items_of(order.id)?);
        Ok(order)
    }
}

/// In-memory store
///
/// Useful for testing and development. One `RwLock` guards all four tables,
/// so every write (including the inventory check-and-decrement) is a single
/// critical section.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    inventory_policy: InventoryPolicy,
}

impl InMemoryStore {
    /// Create an empty store that reserves inventory on each order line
    pub fn new() -> Self {
        Self::with_inventory_policy(InventoryPolicy::default())
    }

    pub fn with_inventory_policy(inventory_policy: InventoryPolicy) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            inventory_policy,
        }
    }

    pub fn inventory_policy(&self) -> InventoryPolicy {
        self.inventory_policy
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| DomainError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| DomainError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_user(&self, id: i64) -> Result<User> {
        let tables = self.read()?;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(RecordKind::User, id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.read()?;
        Ok(tables.users.values().cloned().collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.write()?;

        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(DomainError::duplicate_email(&user.email));
        }

        let id = next_id(&mut tables.last_user_id);
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());

        Ok(created)
    }

    async fn get_product(&self, id: i64) -> Result<Product> {
        let tables = self.read()?;
        tables.product(id).cloned()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let tables = self.read()?;
        Ok(tables.products.values().cloned().collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut tables = self.write()?;

        let id = next_id(&mut tables.last_product_id);
        let created = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            inventory: product.inventory,
            created_at: Utc::now(),
        };
        tables.products.insert(id, created.clone());

        Ok(created)
    }

    async fn get_order(&self, id: i64) -> Result<Order> {
        let tables = self.read()?;
        let order = tables
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(RecordKind::Order, id))?;
        tables.order_with_items(order)
    }

    async fn list_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>> {
        let tables = self.read()?;
        tables
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .map(|order| tables.order_with_items(order))
            .collect()
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let tables = self.read()?;
        Ok(tables.orders.values().cloned().collect())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut tables = self.write()?;

        if !tables.users.contains_key(&order.user_id) {
            return Err(DomainError::not_found(RecordKind::User, order.user_id));
        }

        let id = next_id(&mut tables.last_order_id);
        let created = Order {
            id,
            user_id: order.user_id,
            status: order.status,
            total: order.total,
            created_at: Utc::now(),
            items: None,
        };
        tables.orders.insert(id, created.clone());

        Ok(Order {
            items: Some(Vec::new()),
            ..created
        })
    }

    async fn update_order_status(&self, id: i64, status: &str) -> Result<Order> {
        let mut tables = self.write()?;

        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(RecordKind::Order, id))?;
        order.status = status.to_string();
        let updated = order.clone();

        tables.order_with_items(&updated)
    }

    async fn get_order_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let tables = self.read()?;
        tables.items_of(order_id)
    }

    async fn add_order_item(&self, item: NewOrderItem) -> Result<OrderItem> {
        let mut tables = self.write()?;

        if !tables.orders.contains_key(&item.order_id) {
            return Err(DomainError::not_found(RecordKind::Order, item.order_id));
        }

        let available = tables.product(item.product_id)?.inventory;
        if item.quantity > available {
            return Err(DomainError::InsufficientInventory {
                product_id: item.product_id,
                requested: item.quantity,
                available,
            });
        }

        if self.inventory_policy == InventoryPolicy::Reserve
            && let Some(product) = tables.products.get_mut(&item.product_id)
        {
            product.inventory -= item.quantity;
        }

        let id = next_id(&mut tables.last_order_item_id);
        let stored = OrderItem {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            product: None,
        };
        tables.order_items.insert(id, stored.clone());

        let product = tables.product(item.product_id)?.clone();
        Ok(OrderItem {
            product: Some(product),
            ..stored
        })
    }
}
