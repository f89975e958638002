//! Utility functions for GraphQL execution

use crate::core::error::Result;
use crate::core::{ArgValue, Arguments, DomainError, GraphQLError, PathSegment};
use crate::schema::FieldDef;
use graphql_parser::query::{Type, Value as GqlValue};
use serde_json::{Map, Value, json};

/// Convert GraphQL value to JSON, substituting variables
///
/// Variables missing from `variables` become `null`. Non-finite floats have
/// no JSON form and also become `null`; validation rejects them first (see
/// [`has_non_finite_float`]).
pub fn gql_value_to_json(value: &GqlValue<String>, variables: &Map<String, Value>) -> Value {
    match value {
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => i.as_i64().map_or(Value::Null, Value::from),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|item| gql_value_to_json(item, variables))
                .collect(),
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json(v, variables));
            }
            Value::Object(map)
        }
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
    }
}

/// Whether a literal contains a float that overflowed to infinity (`1e400`)
pub fn has_non_finite_float(value: &GqlValue<String>) -> bool {
    match value {
        GqlValue::Float(f) => !f.is_finite(),
        GqlValue::List(list) => list.iter().any(has_non_finite_float),
        GqlValue::Object(obj) => obj.values().any(has_non_finite_float),
        _ => false,
    }
}

/// Names of all variables referenced inside a value
pub fn referenced_variables<'v>(value: &'v GqlValue<String>, out: &mut Vec<&'v str>) {
    match value {
        GqlValue::Variable(name) => out.push(name),
        GqlValue::List(list) => {
            for item in list {
                referenced_variables(item, out);
            }
        }
        GqlValue::Object(obj) => {
            for item in obj.values() {
                referenced_variables(item, out);
            }
        }
        _ => {}
    }
}

/// Render a variable type the way it was written (`Int!`, `[String]`)
pub fn type_to_string(ty: &Type<String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::ListType(inner) => format!("[{}]", type_to_string(inner)),
        Type::NonNullType(inner) => format!("{}!", type_to_string(inner)),
    }
}

/// Innermost named type of a variable type
pub fn base_type_name<'t>(ty: &'t Type<String>) -> &'t str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => base_type_name(inner),
    }
}

/// Coerce the provided argument values against a field's argument definitions
///
/// Runs before the resolver body: a required argument that is absent or
/// null, or any value of the wrong kind, fails with `InvalidArgument`.
pub fn coerce_arguments(definition: &FieldDef, provided: &Map<String, Value>) -> Result<Arguments> {
    let mut arguments = Arguments::new();

    for argument in &definition.arguments {
        match provided.get(&argument.name) {
            None | Some(Value::Null) if argument.required => {
                return Err(DomainError::invalid_argument(
                    &argument.name,
                    format!("required argument of type {}! was not provided", argument.kind),
                ));
            }
            None => {}
            Some(raw) => {
                arguments.insert(
                    argument.name.clone(),
                    ArgValue::coerce(&argument.name, argument.kind, raw)?,
                );
            }
        }
    }

    Ok(arguments)
}

/// Extend a response path by one segment
pub fn child_path(path: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut child = path.to_vec();
    child.push(segment.into());
    child
}

/// Attach a resolver failure to the field that produced it
pub fn field_error(
    err: &DomainError,
    position: graphql_parser::Pos,
    path: Vec<PathSegment>,
) -> GraphQLError {
    if let DomainError::Storage(message) = err {
        tracing::warn!(%message, "Storage failure while resolving field");
    }
    GraphQLError::from_domain(err).at(position).with_path(path)
}
