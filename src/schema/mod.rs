//! Schema registry and resolver set of the storefront
//!
//! [`storefront_schema`] declares the two entry points (Query and Mutation)
//! and the four record types. Each field is bound to a [`Resolver`], and
//! [`resolvers`] implements those resolvers against a [`Store`](crate::core::Store).

pub mod registry;
pub mod resolvers;

pub use registry::{
    ArgumentDef, FieldDef, MUTATION_TYPE, MutationResolver, ObjectType, QUERY_TYPE,
    QueryResolver, RelationResolver, Resolver, Schema, TYPENAME_FIELD, TypeRef,
};
pub use resolvers::{Resolved, ResolverContext};

use crate::core::ScalarKind::{Float, Int, String as Str};

/// Build the storefront schema
pub fn storefront_schema() -> Schema {
    let mut schema = Schema::new();

    schema.register(
        ObjectType::new(QUERY_TYPE)
            .with_field(
                FieldDef::new(
                    "user",
                    TypeRef::object("User"),
                    Resolver::Query(QueryResolver::User),
                )
                .optional_argument("id", Int),
            )
            .with_field(FieldDef::new(
                "users",
                TypeRef::list_of(TypeRef::object("User")),
                Resolver::Query(QueryResolver::Users),
            ))
            .with_field(
                FieldDef::new(
                    "product",
                    TypeRef::object("Product"),
                    Resolver::Query(QueryResolver::Product),
                )
                .optional_argument("id", Int),
            )
            .with_field(FieldDef::new(
                "products",
                TypeRef::list_of(TypeRef::object("Product")),
                Resolver::Query(QueryResolver::Products),
            ))
            .with_field(
                FieldDef::new(
                    "order",
                    TypeRef::object("Order"),
                    Resolver::Query(QueryResolver::Order),
                )
                .optional_argument("id", Int),
            )
            .with_field(FieldDef::new(
                "orders",
                TypeRef::list_of(TypeRef::object("Order")),
                Resolver::Query(QueryResolver::Orders),
            )),
    );

    schema.register(
        ObjectType::new(MUTATION_TYPE)
            .with_field(
                FieldDef::new(
                    "createUser",
                    TypeRef::object("User"),
                    Resolver::Mutation(MutationResolver::CreateUser),
                )
                .argument("name", Str)
                .argument("email", Str)
                .argument("password", Str),
            )
            .with_field(
                FieldDef::new(
                    "createProduct",
                    TypeRef::object("Product"),
                    Resolver::Mutation(MutationResolver::CreateProduct),
                )
                .argument("name", Str)
                .optional_argument("description", Str)
                .argument("price", Float)
                .argument("inventory", Int),
            )
            .with_field(
                FieldDef::new(
                    "createOrder",
                    TypeRef::object("Order"),
                    Resolver::Mutation(MutationResolver::CreateOrder),
                )
                .argument("user_id", Int)
                .argument("status", Str)
                .argument("total", Float),
            )
            .with_field(
                FieldDef::new(
                    "addOrderItem",
                    TypeRef::object("OrderItem"),
                    Resolver::Mutation(MutationResolver::AddOrderItem),
                )
                .argument("order_id", Int)
                .argument("product_id", Int)
                .argument("quantity", Int)
                .argument("price", Float),
            )
            .with_field(
                FieldDef::new(
                    "updateOrderStatus",
                    TypeRef::object("Order"),
                    Resolver::Mutation(MutationResolver::UpdateOrderStatus),
                )
                .argument("id", Int)
                .argument("status", Str),
            ),
    );

    schema.register(
        ObjectType::new("User")
            .with_field(FieldDef::column("id", Int))
            .with_field(FieldDef::column("name", Str))
            .with_field(FieldDef::column("email", Str))
            .with_field(FieldDef::column("created_at", Str))
            .with_field(FieldDef::new(
                "orders",
                TypeRef::list_of(TypeRef::object("Order")),
                Resolver::Relation(RelationResolver::UserOrders),
            )),
    );

    schema.register(
        ObjectType::new("Product")
            .with_field(FieldDef::column("id", Int))
            .with_field(FieldDef::column("name", Str))
            .with_field(FieldDef::column("description", Str))
            .with_field(FieldDef::column("price", Float))
            .with_field(FieldDef::column("inventory", Int))
            .with_field(FieldDef::column("created_at", Str)),
    );

    schema.register(
        ObjectType::new("Order")
            .with_field(FieldDef::column("id", Int))
            .with_field(FieldDef::column("user_id", Int))
            .with_field(FieldDef::column("status", Str))
            .with_field(FieldDef::column("total", Float))
            .with_field(FieldDef::column("created_at", Str))
            .with_field(FieldDef::new(
                "items",
                TypeRef::list_of(TypeRef::object("OrderItem")),
                Resolver::Relation(RelationResolver::OrderItems),
            )),
    );

    schema.register(
        ObjectType::new("OrderItem")
            .with_field(FieldDef::column("id", Int))
            .with_field(FieldDef::column("order_id", Int))
            .with_field(FieldDef::column("product_id", Int))
            .with_field(FieldDef::column("quantity", Int))
            .with_field(FieldDef::column("price", Float))
            .with_field(FieldDef::new(
                "product",
                TypeRef::object("Product"),
                Resolver::Relation(RelationResolver::OrderItemProduct),
            )),
    );

    schema
}
