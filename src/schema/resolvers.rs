//! Resolver implementations
//!
//! Root resolvers validate their arguments and delegate to the store.
//! Relationship resolvers project embedded data off the parent record and only
//! fall back to a store read when the parent was loaded without it.

use super::registry::{MutationResolver, QueryResolver, RelationResolver, Resolver};
use crate::core::error::{DomainError, Result};
use crate::core::{
    Arguments, GraphObject, NewOrder, NewOrderItem, NewProduct, NewUser, RecordKind, Store,
};
use serde_json::Value;

/// What resolvers get to work with
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub store: &'a dyn Store,
}

impl<'a> ResolverContext<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }
}

/// Value produced by a resolver, before sub-selections are applied
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Null,
    Scalar(Value),
    Object(GraphObject),
    List(Vec<Resolved>),
}

impl Resolved {
    fn object(value: impl Into<GraphObject>) -> Self {
        Resolved::Object(value.into())
    }

    fn objects<T: Into<GraphObject>>(values: Vec<T>) -> Self {
        Resolved::List(values.into_iter().map(Resolved::object).collect())
    }
}

impl Resolver {
    /// Produce the value of `field_name` from its arguments and parent
    ///
    /// `parent` is `None` for root fields.
    pub async fn resolve(
        &self,
        ctx: ResolverContext<'_>,
        field_name: &str,
        args: &Arguments,
        parent: Option<&GraphObject>,
    ) -> Result<Resolved> {
        match self {
            Resolver::Column => {
                let parent = parent.ok_or_else(|| missing_parent(field_name))?;
                parent
                    .scalar(field_name)
                    .map(Resolved::Scalar)
                    .ok_or_else(|| {
                        DomainError::Internal(format!(
                            "'{}' is not a column of {}",
                            field_name,
                            parent.type_name()
                        ))
                    })
            }
            Resolver::TypeName(name) => Ok(Resolved::Scalar(Value::String(name.clone()))),
            Resolver::Query(query) => resolve_query(ctx, *query, args).await,
            Resolver::Mutation(mutation) => resolve_mutation(ctx, *mutation, args).await,
            Resolver::Relation(relation) => {
                let parent = parent.ok_or_else(|| missing_parent(field_name))?;
                resolve_relation(ctx, *relation, parent).await
            }
        }
    }
}

fn missing_parent(field_name: &str) -> DomainError {
    DomainError::Internal(format!("field '{}' resolved without a parent", field_name))
}

/// Read a nullable id argument, failing with the record kind's own message
fn record_id(args: &Arguments, kind: RecordKind) -> Result<i64> {
    args.get("id")
        .and_then(|value| value.as_int())
        .ok_or_else(|| DomainError::invalid_argument("id", format!("invalid {} ID", kind)))
}

async fn resolve_query(
    ctx: ResolverContext<'_>,
    query: QueryResolver,
    args: &Arguments,
) -> Result<Resolved> {
    let store = ctx.store;
    match query {
        QueryResolver::User => {
            let id = record_id(args, RecordKind::User)?;
            Ok(Resolved::object(store.get_user(id).await?))
        }
        QueryResolver::Users => Ok(Resolved::objects(store.list_users().await?)),
        QueryResolver::Product => {
            let id = record_id(args, RecordKind::Product)?;
            Ok(Resolved::object(store.get_product(id).await?))
        }
        QueryResolver::Products => Ok(Resolved::objects(store.list_products().await?)),
        QueryResolver::Order => {
            let id = record_id(args, RecordKind::Order)?;
            Ok(Resolved::object(store.get_order(id).await?))
        }
        QueryResolver::Orders => Ok(Resolved::objects(store.list_all_orders().await?)),
    }
}

async fn resolve_mutation(
    ctx: ResolverContext<'_>,
    mutation: MutationResolver,
    args: &Arguments,
) -> Result<Resolved> {
    let store = ctx.store;
    match mutation {
        MutationResolver::CreateUser => {
            let user = NewUser {
                name: args.string("name")?,
                email: args.string("email")?,
                password: args.string("password")?,
            };
            let created = store.create_user(user).await?;
            tracing::debug!(id = created.id, "Created user");
            Ok(Resolved::object(created))
        }
        MutationResolver::CreateProduct => {
            let product = NewProduct {
                name: args.string("name")?,
                description: args.optional_string("description")?,
                price: args.float("price")?,
                inventory: args.int("inventory")?,
            };
            if product.price < 0.0 {
                return Err(DomainError::invalid_argument("price", "must not be negative"));
            }
            if product.inventory < 0 {
                return Err(DomainError::invalid_argument("inventory", "must not be negative"));
            }
            let created = store.create_product(product).await?;
            tracing::debug!(id = created.id, "Created product");
            Ok(Resolved::object(created))
        }
        MutationResolver::CreateOrder => {
            let order = NewOrder {
                user_id: args.int("user_id")?,
                status: args.string("status")?,
                total: args.float("total")?,
            };
            let created = store.create_order(order).await?;
            tracing::debug!(id = created.id, user_id = created.user_id, "Created order");
            Ok(Resolved::object(created))
        }
        MutationResolver::AddOrderItem => {
            let item = NewOrderItem {
                order_id: args.int("order_id")?,
                product_id: args.int("product_id")?,
                quantity: args.int("quantity")?,
                price: args.float("price")?,
            };
            if item.quantity <= 0 {
                return Err(DomainError::invalid_argument("quantity", "must be positive"));
            }

            // Early rejection; the store repeats the check atomically with its write
            let product = store.get_product(item.product_id).await?;
            if item.quantity > product.inventory {
                return Err(DomainError::InsufficientInventory {
                    product_id: product.id,
                    requested: item.quantity,
                    available: product.inventory,
                });
            }

            let created = store.add_order_item(item).await?;
            tracing::debug!(
                id = created.id,
                order_id = created.order_id,
                product_id = created.product_id,
                quantity = created.quantity,
                "Added order item"
            );
            Ok(Resolved::object(created))
        }
        MutationResolver::UpdateOrderStatus => {
            let id = args.int("id")?;
            let status = args.string("status")?;
            let updated = store.update_order_status(id, &status).await?;
            tracing::debug!(id, status = %updated.status, "Updated order status");
            Ok(Resolved::object(updated))
        }
    }
}

async fn resolve_relation(
    ctx: ResolverContext<'_>,
    relation: RelationResolver,
    parent: &GraphObject,
) -> Result<Resolved> {
    let store = ctx.store;
    match (relation, parent) {
        (RelationResolver::UserOrders, GraphObject::User(user)) => {
            Ok(Resolved::objects(store.list_orders_for_user(user.id).await?))
        }
        (RelationResolver::OrderItems, GraphObject::Order(order)) => match &order.items {
            Some(items) => Ok(Resolved::objects(items.clone())),
            None => Ok(Resolved::objects(
                store.get_order_items_for_order(order.id).await?,
            )),
        },
        (RelationResolver::OrderItemProduct, GraphObject::OrderItem(item)) => match &item.product
        {
            Some(product) => Ok(Resolved::object(product.clone())),
            None => Ok(Resolved::object(store.get_product(item.product_id).await?)),
        },
        (relation, parent) => Err(DomainError::Internal(format!(
            "relation {:?} cannot be resolved on a {} parent",
            relation,
            parent.type_name()
        ))),
    }
}
