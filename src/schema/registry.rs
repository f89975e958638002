//! Type registry binding (type, field) pairs to field descriptors
//!
//! The registry is an explicit table: each [`ObjectType`] maps field names to
//! a [`FieldDef`] holding the field's return type, its argument definitions and the
//! [`Resolver`] that produces its value.

use crate::core::ScalarKind;
use indexmap::IndexMap;
use std::fmt;

/// Name of the query root type
pub const QUERY_TYPE: &str = "Query";
/// Name of the mutation root type
pub const MUTATION_TYPE: &str = "Mutation";
/// Meta field answering the name of the enclosing object type
pub const TYPENAME_FIELD: &str = "__typename";

/// Output type of a field
///
/// Every output position is nullable: a field whose resolver fails is
/// answered with `null` and an entry in `errors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Object(String),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn object(name: impl Into<String>) -> Self {
        TypeRef::Object(name.into())
    }

    pub fn list_of(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Name of the object type at the core of this type, if any
    ///
    /// Fields with an object core must be queried with a sub-selection;
    /// scalar fields must not.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            TypeRef::Scalar(_) => None,
            TypeRef::Object(name) => Some(name),
            TypeRef::List(inner) => inner.object_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(kind) => write!(f, "{}", kind),
            TypeRef::Object(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

/// Declared argument of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDef {
    pub name: String,
    pub kind: ScalarKind,
    /// Non-nullable arguments must be present and non-null
    pub required: bool,
}

/// Root query fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryResolver {
    User,
    Users,
    Product,
    Products,
    Order,
    Orders,
}

/// Root mutation fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationResolver {
    CreateUser,
    CreateProduct,
    CreateOrder,
    AddOrderItem,
    UpdateOrderStatus,
}

/// Fields derived from an already resolved parent record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationResolver {
    /// `User.orders`
    UserOrders,
    /// `Order.items`
    OrderItems,
    /// `OrderItem.product`
    OrderItemProduct,
}

/// How a field produces its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Project the same-named scalar column off the parent record
    Column,
    /// Answer the enclosing type's name
    TypeName(String),
    Query(QueryResolver),
    Mutation(MutationResolver),
    Relation(RelationResolver),
}

/// Descriptor of one field of an object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: Vec<ArgumentDef>,
    pub resolver: Resolver,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            resolver,
        }
    }

    /// A scalar column projected off the parent record
    pub fn column(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, TypeRef::Scalar(kind), Resolver::Column)
    }

    /// Declare a non-nullable argument
    pub fn argument(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.arguments.push(ArgumentDef {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    /// Declare a nullable argument
    pub fn optional_argument(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.arguments.push(ArgumentDef {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    pub fn find_argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}

/// An object type and its fields, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    fields: IndexMap<String, FieldDef>,
}

impl ObjectType {
    /// Create an object type carrying only the `__typename` meta field
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut fields = IndexMap::new();
        fields.insert(
            TYPENAME_FIELD.to_string(),
            FieldDef::new(
                TYPENAME_FIELD,
                TypeRef::Scalar(ScalarKind::String),
                Resolver::TypeName(name.clone()),
            ),
        );
        Self { name, fields }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Declared fields, excluding the `__typename` meta field
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .values()
            .filter(|field| field.name != TYPENAME_FIELD)
    }
}

/// The complete set of object types, including both root types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    types: IndexMap<String, ObjectType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an object type
    pub fn register(&mut self, object: ObjectType) {
        self.types.insert(object.name.clone(), object);
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.object(type_name)?.field(field_name)
    }

    pub fn query_type(&self) -> Option<&ObjectType> {
        self.object(QUERY_TYPE)
    }

    pub fn mutation_type(&self) -> Option<&ObjectType> {
        self.object(MUTATION_TYPE)
    }

    pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }
}
