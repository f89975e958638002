//! Contract tests every `Store` implementation must pass
//!
//! The factory expression must produce a store using the `Reserve` inventory
//! policy. The calling test file must have `storefront::core::*` and
//! `store_harness::*` in scope.

#[macro_export]
macro_rules! store_contract_tests {
    ($factory:expr) => {
        mod store_contract_tests {
            use super::*;
            use std::sync::Arc;

            // =================================================================
            // Users and products
            // =================================================================

            #[tokio::test]
            async fn test_create_and_get_user() {
                let store = $factory;
                let created = store
                    .create_user(new_user("Alice", "alice@test.com"))
                    .await
                    .unwrap();

                assert!(created.id > 0);
                let fetched = store.get_user(created.id).await.unwrap();
                assert_eq!(fetched.name, "Alice");
                assert_eq!(fetched.email, "alice@test.com");
                assert_eq!(fetched.password, "hunter2");
            }

            #[tokio::test]
            async fn test_duplicate_email_conflicts() {
                let store = $factory;
                store
                    .create_user(new_user("Alice", "alice@test.com"))
                    .await
                    .unwrap();

                let err = store
                    .create_user(new_user("Alice Again", "alice@test.com"))
                    .await
                    .unwrap_err();

                assert_code(&err, "CONFLICT");
                assert_count(&store.list_users().await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_list_users_in_creation_order() {
                let store = $factory;
                let users = [("A", "a@test.com"), ("B", "b@test.com"), ("C", "c@test.com")];
                for (name, email) in users {
                    store.create_user(new_user(name, email)).await.unwrap();
                }

                let names: Vec<String> = store
                    .list_users()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|user| user.name)
                    .collect();
                assert_eq!(names, vec!["A", "B", "C"]);
            }

            #[tokio::test]
            async fn test_create_and_get_product() {
                let store = $factory;
                let created = store
                    .create_product(new_product("Widget", 9.99, 5))
                    .await
                    .unwrap();

                let fetched = store.get_product(created.id).await.unwrap();
                assert_eq!(fetched.name, "Widget");
                assert_eq!(fetched.description.as_deref(), Some("Widget description"));
                assert_eq!(fetched.price, 9.99);
                assert_eq!(fetched.inventory, 5);
                assert_count(&store.list_products().await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_missing_records_are_not_found() {
                let store = $factory;

                assert_code(&store.get_user(999).await.unwrap_err(), "NOT_FOUND");
                assert_code(&store.get_product(999).await.unwrap_err(), "NOT_FOUND");
                assert_code(&store.get_order(999).await.unwrap_err(), "NOT_FOUND");
            }

            // =================================================================
            // Orders
            // =================================================================

            #[tokio::test]
            async fn test_create_order_requires_user() {
                let store = $factory;
                let err = store.create_order(new_order(42, 10.0)).await.unwrap_err();

                assert_code(&err, "NOT_FOUND");
                assert_count(&store.list_all_orders().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_new_order_has_no_items() {
                let store = $factory;
                let fixture = seed(&store, 10).await;

                let order = store.get_order(fixture.order.id).await.unwrap();
                assert_eq!(order.user_id, fixture.user.id);
                assert_eq!(order.status, "pending");
                assert_eq!(order.total, 19.98);
                assert_eq!(order.items.map(|items| items.len()), Some(0));
            }

            #[tokio::test]
            async fn test_update_order_status_changes_only_status() {
                let store = $factory;
                let fixture = seed(&store, 10).await;

                let updated = store
                    .update_order_status(fixture.order.id, "shipped")
                    .await
                    .unwrap();

                assert_eq!(updated.id, fixture.order.id);
                assert_eq!(updated.status, "shipped");
                assert_eq!(updated.total, fixture.order.total);
                assert_eq!(updated.user_id, fixture.order.user_id);
                assert_eq!(updated.created_at, fixture.order.created_at);
            }

            #[tokio::test]
            async fn test_update_missing_order_is_not_found() {
                let store = $factory;
                let err = store.update_order_status(77, "shipped").await.unwrap_err();
                assert_code(&err, "NOT_FOUND");
            }

            #[tokio::test]
            async fn test_list_all_orders_is_thin() {
                let store = $factory;
                let fixture = seed(&store, 10).await;
                store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 1, 9.99))
                    .await
                    .unwrap();

                let orders = store.list_all_orders().await.unwrap();
                assert_count(&orders, 1);
                assert!(orders[0].items.is_none());
            }

            #[tokio::test]
            async fn test_list_orders_for_user_populates_items() {
                let store = $factory;
                let fixture = seed(&store, 10).await;
                store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 2, 9.99))
                    .await
                    .unwrap();

                let other = store
                    .create_user(new_user("Bob", "bob@test.com"))
                    .await
                    .unwrap();
                store.create_order(new_order(other.id, 1.0)).await.unwrap();

                let orders = store.list_orders_for_user(fixture.user.id).await.unwrap();
                assert_count(&orders, 1);

                let items = orders[0].items.as_ref().unwrap();
                assert_count(items, 1);
                assert_eq!(items[0].product.as_ref().unwrap().name, "Widget");
            }

            // =================================================================
            // Order items and inventory
            // =================================================================

            #[tokio::test]
            async fn test_add_item_reserves_inventory() {
                let store = $factory;
                let fixture = seed(&store, 10).await;

                let item = store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 4, 9.99))
                    .await
                    .unwrap();

                assert_eq!(item.order_id, fixture.order.id);
                assert_eq!(item.quantity, 4);
                assert_eq!(item.price, 9.99);
                assert_eq!(item.product.as_ref().unwrap().id, fixture.product.id);

                let product = store.get_product(fixture.product.id).await.unwrap();
                assert_eq!(product.inventory, 6);
            }

            #[tokio::test]
            async fn test_add_item_exceeding_inventory_changes_nothing() {
                let store = $factory;
                let fixture = seed(&store, 3).await;

                let err = store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 4, 9.99))
                    .await
                    .unwrap_err();

                assert_eq!(
                    err,
                    DomainError::InsufficientInventory {
                        product_id: fixture.product.id,
                        requested: 4,
                        available: 3,
                    }
                );
                let product = store.get_product(fixture.product.id).await.unwrap();
                assert_eq!(product.inventory, 3);
                assert_count(
                    &store
                        .get_order_items_for_order(fixture.order.id)
                        .await
                        .unwrap(),
                    0,
                );
            }

            #[tokio::test]
            async fn test_add_item_exact_inventory_succeeds() {
                let store = $factory;
                let fixture = seed(&store, 3).await;

                store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 3, 9.99))
                    .await
                    .unwrap();

                let product = store.get_product(fixture.product.id).await.unwrap();
                assert_eq!(product.inventory, 0);
            }

            #[tokio::test]
            async fn test_add_item_to_missing_order_or_product() {
                let store = $factory;
                let fixture = seed(&store, 10).await;

                let err = store
                    .add_order_item(new_item(999, fixture.product.id, 1, 1.0))
                    .await
                    .unwrap_err();
                assert_code(&err, "NOT_FOUND");

                let err = store
                    .add_order_item(new_item(fixture.order.id, 999, 1, 1.0))
                    .await
                    .unwrap_err();
                assert_code(&err, "NOT_FOUND");

                let product = store.get_product(fixture.product.id).await.unwrap();
                assert_eq!(product.inventory, 10);
            }

            #[tokio::test]
            async fn test_order_items_keep_insertion_order() {
                let store = $factory;
                let fixture = seed(&store, 10).await;
                let gadget = store
                    .create_product(new_product("Gadget", 24.5, 10))
                    .await
                    .unwrap();

                store
                    .add_order_item(new_item(fixture.order.id, fixture.product.id, 1, 9.99))
                    .await
                    .unwrap();
                store
                    .add_order_item(new_item(fixture.order.id, gadget.id, 2, 24.5))
                    .await
                    .unwrap();

                let items = store
                    .get_order_items_for_order(fixture.order.id)
                    .await
                    .unwrap();
                let names: Vec<&str> = items
                    .iter()
                    .map(|item| item.product.as_ref().unwrap().name.as_str())
                    .collect();
                assert_eq!(names, vec!["Widget", "Gadget"]);

                let order = store.get_order(fixture.order.id).await.unwrap();
                assert_eq!(order.items.unwrap().len(), 2);
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_reservations_never_oversell() {
                let store = Arc::new($factory);
                let fixture = seed(store.as_ref(), 10).await;

                let mut handles = Vec::new();
                for _ in 0..8 {
                    let store = store.clone();
                    let order_id = fixture.order.id;
                    let product_id = fixture.product.id;
                    handles.push(tokio::spawn(async move {
                        store
                            .add_order_item(new_item(order_id, product_id, 3, 9.99))
                            .await
                    }));
                }

                let mut succeeded = 0;
                for handle in handles {
                    match handle.await.unwrap() {
                        Ok(_) => succeeded += 1,
                        Err(err) => assert_code(&err, "INSUFFICIENT_INVENTORY"),
                    }
                }

                assert_eq!(succeeded, 3);
                let product = store.get_product(fixture.product.id).await.unwrap();
                assert_eq!(product.inventory, 1);
                assert_count(
                    &store
                        .get_order_items_for_order(fixture.order.id)
                        .await
                        .unwrap(),
                    3,
                );
            }
        }
    };
}
