//! Core module containing the domain model, the persistence gateway trait
//! and the error taxonomy

pub mod argument;
pub mod error;
pub mod model;
pub mod store;

pub use argument::{ArgValue, Arguments, ScalarKind};
pub use error::{DomainError, GraphQLError, PathSegment, RequestError};
pub use model::{
    GraphObject, NewOrder, NewOrderItem, NewProduct, NewUser, Order, OrderItem, Product,
    RecordKind, User,
};
pub use store::{InventoryPolicy, Store};
