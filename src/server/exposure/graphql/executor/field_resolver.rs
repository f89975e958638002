//! Field and relation resolution for planned selections
//!
//! Each function returns the completed JSON value together with the errors
//! raised inside its sub-tree. A failing field resolves to `null` and never
//! aborts its siblings.

use futures::future::{BoxFuture, FutureExt, join_all};
use serde_json::{Map, Value};

use super::utils;
use super::validation::PlannedField;
use crate::core::{GraphObject, GraphQLError, PathSegment, Store};
use crate::schema::{Resolved, ResolverContext};

/// A completed value and the field errors collected while producing it
pub type Completion = (Value, Vec<GraphQLError>);

/// Resolve one field against its parent (`None` at the root)
pub fn resolve_field<'a, 'b>(
    store: &'a dyn Store,
    field: &'a PlannedField<'a>,
    parent: Option<&'b GraphObject>,
    path: Vec<PathSegment>,
) -> BoxFuture<'b, Completion>
where
    'a: 'b,
{
    async move {
        let arguments = match utils::coerce_arguments(field.definition, &field.arguments) {
            Ok(arguments) => arguments,
            Err(e) => return (Value::Null, vec![utils::field_error(&e, field.position, path)]),
        };

        let resolved = field
            .definition
            .resolver
            .resolve(ResolverContext::new(store), &field.name, &arguments, parent)
            .await;

        match resolved {
            Ok(resolved) => complete_value(store, field, resolved, path).await,
            Err(e) => (Value::Null, vec![utils::field_error(&e, field.position, path)]),
        }
    }
    .boxed()
}

/// Turn a resolver result into JSON, applying the field's sub-selection
fn complete_value<'a>(
    store: &'a dyn Store,
    field: &'a PlannedField<'a>,
    resolved: Resolved,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Completion> {
    async move {
        match resolved {
            Resolved::Null => (Value::Null, Vec::new()),
            Resolved::Scalar(value) => (value, Vec::new()),
            Resolved::Object(object) => resolve_object(store, &field.selection, object, path).await,
            Resolved::List(items) => {
                let completions = join_all(items.into_iter().enumerate().map(|(index, item)| {
                    complete_value(store, field, item, utils::child_path(&path, index))
                }))
                .await;

                let mut values = Vec::with_capacity(completions.len());
                let mut errors = Vec::new();
                for (value, item_errors) in completions {
                    values.push(value);
                    errors.extend(item_errors);
                }
                (Value::Array(values), errors)
            }
        }
    }
    .boxed()
}

/// Resolve every selected field of an object concurrently
pub fn resolve_object<'a>(
    store: &'a dyn Store,
    selection: &'a [PlannedField<'a>],
    object: GraphObject,
    path: Vec<PathSegment>,
) -> BoxFuture<'a, Completion> {
    async move {
        let completions = join_all(selection.iter().map(|field| {
            resolve_field(
                store,
                field,
                Some(&object),
                utils::child_path(&path, field.response_key.as_str()),
            )
        }))
        .await;

        assemble(selection, completions)
    }
    .boxed()
}

/// Build the response object from completions in selection order
pub fn assemble(selection: &[PlannedField<'_>], completions: Vec<Completion>) -> Completion {
    let mut map = Map::new();
    let mut errors = Vec::new();

    for (field, (value, field_errors)) in selection.iter().zip(completions) {
        map.insert(field.response_key.clone(), value);
        errors.extend(field_errors);
    }

    (Value::Object(map), errors)
}
