//! Mutation execution for GraphQL

use super::field_resolver::{self, Completion};
use super::validation::PlannedField;
use crate::core::Store;

/// Execute the root fields of a mutation, one after another
///
/// Each root field (and its whole sub-selection) completes before the next
/// one starts, so later mutations observe the writes of earlier ones. A
/// failing mutation does not stop the ones after it.
pub async fn execute_mutation(store: &dyn Store, fields: &[PlannedField<'_>]) -> Completion {
    let mut completions = Vec::with_capacity(fields.len());

    for field in fields {
        tracing::debug!(field = %field.name, "Executing mutation");
        let path = vec![field.response_key.as_str().into()];
        let completion = field_resolver::resolve_field(store, field, None, path).await;
        completions.push(completion);
    }

    field_resolver::assemble(fields, completions)
}
