//! Typed error handling for the storefront
//!
//! Three layers of errors exist, one per boundary:
//!
//! - [`DomainError`]: raised by the persistence gateway and the resolvers.
//!   Every variant maps to a stable code exposed in `extensions.code`.
//! - [`GraphQLError`]: the error object placed in a GraphQL response's
//!   `errors` array, carrying message, locations and response path.
//! - [`RequestError`]: transport failures that never reach the executor
//!   (malformed request bodies). Rendered directly as an HTTP response.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! match store.get_user(7).await {
//!     Ok(user) => println!("found {}", user.name),
//!     Err(DomainError::NotFound { kind, id }) => println!("no {kind} {id}"),
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! ```

use crate::core::model::RecordKind;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use graphql_parser::Pos;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Result alias used by the gateway and the resolvers
pub type Result<T, E = DomainError> = std::result::Result<T, E>;

// =============================================================================
// Domain Errors
// =============================================================================

/// Errors produced while reading or writing storefront records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// A referenced record does not exist
    #[error("{kind} with id {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    /// A required argument is missing or has the wrong type or range
    #[error("invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// A uniqueness constraint was violated
    #[error("{message}")]
    Conflict { message: String },

    /// The requested quantity exceeds the product's stock
    #[error(
        "not enough inventory for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientInventory {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Underlying persistence failure, not further classified
    #[error("storage error: {0}")]
    Storage(String),

    /// The executor handed a resolver something it cannot work with
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        DomainError::NotFound { kind, id }
    }

    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: &str) -> Self {
        DomainError::Conflict {
            message: format!("user with email '{}' already exists", email),
        }
    }

    /// Stable machine-readable code, exposed as `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            DomainError::Conflict { .. } => "CONFLICT",
            DomainError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            DomainError::Storage(_) => "STORAGE_ERROR",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status a REST-style consumer would associate with this error
    ///
    /// The GraphQL endpoint always answers 200 for field errors; this mapping
    /// exists for custom routes that surface domain errors directly.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            DomainError::Conflict { .. } => StatusCode::CONFLICT,
            DomainError::InsufficientInventory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "errors": [GraphQLError::from_domain(&self)]
        }));
        (status, body).into_response()
    }
}

// =============================================================================
// GraphQL Response Errors
// =============================================================================

/// A source location inside the query document (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl From<Pos> for Location {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

/// One segment of a response path: an object key or a list index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Extra machine-readable error information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// An entry of the `errors` array of a GraphQL response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }

    /// Error raised while validating a document against the schema
    pub fn validation(message: impl Into<String>, pos: Pos) -> Self {
        Self::new(message)
            .at(pos)
            .with_code("GRAPHQL_VALIDATION_FAILED")
    }

    pub fn from_domain(err: &DomainError) -> Self {
        Self::new(err.to_string()).with_code(err.code())
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.locations.push(pos.into());
        self
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions = Some(ErrorExtensions {
            code: code.to_string(),
        });
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().map(|ext| ext.code.as_str())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Failures detected at the transport boundary, before execution
#[derive(Debug, Error)]
pub enum RequestError {
    /// The body was not a JSON object of shape `{query, variables}`
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "errors": [{ "message": self.to_string() }]
        }));
        (status, body).into_response()
    }
}
