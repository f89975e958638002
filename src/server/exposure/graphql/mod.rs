//! GraphQL API exposure
//!
//! Serves `POST /graphql`. Bodies are JSON objects of shape
//! `{query, variables?, operationName?}`; the response is always HTTP 200 with
//! a `{data, errors}` body once the body itself could be read. Malformed
//! bodies are rejected with 400, other methods with 405.

mod executor;

pub use executor::{GraphQLExecutor, GraphQLResponse};

use crate::core::RequestError;
use crate::server::host::ServerHost;
use anyhow::Result;
use axum::{
    Router,
    extract::{Extension, Json, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequestBody {
    query: String,
    #[serde(default)]
    variables: Option<HashMap<String, Value>>,
    #[serde(default)]
    operation_name: Option<String>,
}

/// GraphQL API exposure implementation
///
/// This struct encapsulates all GraphQL-specific logic for exposing the API.
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = Arc::new(builder.build_host()?);
    /// let graphql_app = GraphQLExposure::build_router(host)?;
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let executor = Arc::new(GraphQLExecutor::new(host));

        let router = Router::new()
            .route("/graphql", post(graphql_handler))
            .layer(Extension(executor));

        Ok(router)
    }
}

/// Handler for GraphQL queries and mutations
async fn graphql_handler(
    Extension(executor): Extension<Arc<GraphQLExecutor>>,
    body: std::result::Result<Json<GraphQLRequestBody>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected GraphQL request body");
            return RequestError::MalformedBody(rejection.body_text()).into_response();
        }
    };

    let response = executor
        .execute(
            &request.query,
            request.variables,
            request.operation_name.as_deref(),
        )
        .await;

    Json(response).into_response()
}
