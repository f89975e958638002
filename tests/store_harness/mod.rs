//! Shared test harness for store backend testing
//!
//! Provides builders for the `New*` inputs and the `store_contract_tests!`
//! macro, which validates any `Store` implementation against the full
//! persistence gateway contract.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_contract_tests;

use storefront::core::{
    DomainError, NewOrder, NewOrderItem, NewProduct, NewUser, Order, Product, Store, User,
};

// ---------------------------------------------------------------------------
// Input builders
// ---------------------------------------------------------------------------

pub fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter2".to_string(),
    }
}

pub fn new_product(name: &str, price: f64, inventory: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        price,
        inventory,
    }
}

pub fn new_order(user_id: i64, total: f64) -> NewOrder {
    NewOrder {
        user_id,
        status: "pending".to_string(),
        total,
    }
}

pub fn new_item(order_id: i64, product_id: i64, quantity: i64, price: f64) -> NewOrderItem {
    NewOrderItem {
        order_id,
        product_id,
        quantity,
        price,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A user, one product with the given inventory and an empty order
pub struct Fixture {
    pub user: User,
    pub product: Product,
    pub order: Order,
}

pub async fn seed(store: &dyn Store, inventory: i64) -> Fixture {
    let user = store
        .create_user(new_user("Alice", "alice@test.com"))
        .await
        .unwrap();
    let product = store
        .create_product(new_product("Widget", 9.99, inventory))
        .await
        .unwrap();
    let order = store.create_order(new_order(user.id, 19.98)).await.unwrap();

    Fixture {
        user,
        product,
        order,
    }
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

pub fn assert_code(err: &DomainError, expected: &str) {
    assert_eq!(err.code(), expected, "unexpected error: {}", err);
}
