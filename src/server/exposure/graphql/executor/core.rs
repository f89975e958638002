//! Core GraphQL executor orchestration

use graphql_parser::query::parse_query;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::mutation_executor;
use super::query_executor;
use super::validation::{self, OperationKind};
use crate::core::GraphQLError;
use crate::server::host::ServerHost;

/// Body of a GraphQL response
///
/// `data` is absent when the document failed to parse or validate; `errors`
/// is absent when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    fn rejected(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }
}

/// GraphQL executor running documents against the host's schema and store
pub struct GraphQLExecutor {
    host: Arc<ServerHost>,
}

impl GraphQLExecutor {
    /// Create a new executor with the given host
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Execute a GraphQL document
    ///
    /// Parse and validation failures produce a response with `errors` only.
    /// Otherwise `data` is always present and resolver failures are reported
    /// per field.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<HashMap<String, Value>>,
        operation_name: Option<&str>,
    ) -> GraphQLResponse {
        let document = match parse_query::<String>(query) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected unparsable GraphQL document");
                return GraphQLResponse::rejected(vec![
                    GraphQLError::new(format!("Failed to parse query: {}", e))
                        .with_code("GRAPHQL_PARSE_FAILED"),
                ]);
            }
        };

        let variables: Map<String, Value> = variables.unwrap_or_default().into_iter().collect();

        let plan = match validation::plan(&self.host.schema, &document, operation_name, &variables)
        {
            Ok(plan) => plan,
            Err(errors) => {
                tracing::debug!(count = errors.len(), "Rejected invalid GraphQL document");
                return GraphQLResponse::rejected(errors);
            }
        };

        let store = self.host.store.as_ref();
        let (data, errors) = match plan.kind {
            OperationKind::Query => query_executor::execute_query(store, &plan.fields).await,
            OperationKind::Mutation => {
                mutation_executor::execute_mutation(store, &plan.fields).await
            }
        };

        GraphQLResponse {
            data: Some(data),
            errors,
        }
    }
}
