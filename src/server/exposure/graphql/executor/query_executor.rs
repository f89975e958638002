//! Query execution for GraphQL

use futures::future::join_all;

use super::field_resolver::{self, Completion};
use super::validation::PlannedField;
use crate::core::Store;

/// Execute the root fields of a query
///
/// Root query fields have no ordering constraint between them and are
/// resolved concurrently; the response keeps selection order.
pub async fn execute_query(store: &dyn Store, fields: &[PlannedField<'_>]) -> Completion {
    let completions = join_all(fields.iter().map(|field| {
        field_resolver::resolve_field(store, field, None, vec![field.response_key.as_str().into()])
    }))
    .await;

    field_resolver::assemble(fields, completions)
}
