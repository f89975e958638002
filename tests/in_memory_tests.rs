//! Integration tests for InMemoryStore using the store test harness.
//!
//! This file invokes `store_contract_tests!` to validate that InMemoryStore
//! fully conforms to the `Store` contract, then covers the `CheckOnly`
//! inventory policy, which the contract does not exercise.

#[macro_use]
mod store_harness;

use store_harness::*;
use storefront::core::*;
use storefront::storage::InMemoryStore;

store_contract_tests!(InMemoryStore::new());

mod check_only_policy {
    use super::*;

    #[tokio::test]
    async fn test_check_only_leaves_inventory_untouched() {
        let store = InMemoryStore::with_inventory_policy(InventoryPolicy::CheckOnly);
        let fixture = seed(&store, 5).await;

        for _ in 0..3 {
            store
                .add_order_item(new_item(fixture.order.id, fixture.product.id, 5, 9.99))
                .await
                .unwrap();
        }

        let product = store.get_product(fixture.product.id).await.unwrap();
        assert_eq!(product.inventory, 5);
        assert_count(
            &store
                .get_order_items_for_order(fixture.order.id)
                .await
                .unwrap(),
            3,
        );
    }

    #[tokio::test]
    async fn test_check_only_still_rejects_excess_quantity() {
        let store = InMemoryStore::with_inventory_policy(InventoryPolicy::CheckOnly);
        let fixture = seed(&store, 5).await;

        let err = store
            .add_order_item(new_item(fixture.order.id, fixture.product.id, 6, 9.99))
            .await
            .unwrap_err();
        assert_code(&err, "INSUFFICIENT_INVENTORY");
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        clone
            .create_user(new_user("Alice", "alice@test.com"))
            .await
            .unwrap();
        assert_count(&store.list_users().await.unwrap(), 1);
    }
}
