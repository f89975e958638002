//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Domain errors carry stable codes and HTTP status codes
//! - Error responses are properly formatted
//! - Error matching allows clients to handle specific cases

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use storefront::prelude::*;

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_not_found_returns_404() {
        let err = DomainError::not_found(RecordKind::Order, 1);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_argument_returns_400() {
        let err = DomainError::invalid_argument("quantity", "must be positive");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict_returns_409() {
        let err = DomainError::duplicate_email("a@x.com");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_insufficient_inventory_returns_422() {
        let err = DomainError::InsufficientInventory {
            product_id: 1,
            requested: 10,
            available: 3,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_storage_and_internal_return_500() {
        assert_eq!(
            DomainError::Storage("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DomainError::Internal("bad parent".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_malformed_body_returns_400() {
        let err = RequestError::MalformedBody("EOF while parsing".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_every_variant_has_a_code() {
        let cases = [
            (DomainError::not_found(RecordKind::User, 1), "NOT_FOUND"),
            (
                DomainError::invalid_argument("id", "missing"),
                "INVALID_ARGUMENT",
            ),
            (DomainError::duplicate_email("a@x.com"), "CONFLICT"),
            (
                DomainError::InsufficientInventory {
                    product_id: 1,
                    requested: 2,
                    available: 1,
                },
                "INSUFFICIENT_INVENTORY",
            ),
            (DomainError::Storage("x".into()), "STORAGE_ERROR"),
            (DomainError::Internal("x".into()), "INTERNAL_ERROR"),
        ];

        for (err, code) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(GraphQLError::from_domain(&err).code(), Some(code));
        }
    }

    #[test]
    fn test_messages_are_descriptive() {
        assert_eq!(
            DomainError::duplicate_email("a@x.com").to_string(),
            "user with email 'a@x.com' already exists"
        );
        assert_eq!(
            DomainError::invalid_argument("quantity", "must be positive").to_string(),
            "invalid argument 'quantity': must be positive"
        );
        assert_eq!(
            DomainError::InsufficientInventory {
                product_id: 4,
                requested: 10,
                available: 3,
            }
            .to_string(),
            "not enough inventory for product 4: requested 10, available 3"
        );
    }
}

// =============================================================================
// Response Format Tests
// =============================================================================

mod response_format_tests {
    use super::*;

    #[tokio::test]
    async fn test_domain_error_response_body() {
        let response = DomainError::not_found(RecordKind::Product, 9).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response_json(response).await;
        assert_eq!(
            body,
            json!({
                "errors": [{
                    "message": "product with id 9 not found",
                    "extensions": { "code": "NOT_FOUND" }
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_request_error_response_body() {
        let response = RequestError::MalformedBody("missing field `query`".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(
            body,
            json!({
                "errors": [{ "message": "Invalid request body: missing field `query`" }]
            })
        );
    }

    #[test]
    fn test_graphql_error_with_path_serialization() {
        let err = GraphQLError::from_domain(&DomainError::not_found(RecordKind::User, 3))
            .with_path(vec!["orders".into(), 1.into(), "user".into()]);
        let value = serde_json::to_value(&err).unwrap();

        assert_eq!(value["path"], json!(["orders", 1, "user"]));
        assert!(value.get("locations").is_none());
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_match_insufficient_inventory_details() {
        let err = DomainError::InsufficientInventory {
            product_id: 1,
            requested: 10,
            available: 3,
        };

        match err {
            DomainError::InsufficientInventory {
                requested,
                available,
                ..
            } => assert_eq!(requested - available, 7),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_match_not_found_kind() {
        let err = DomainError::not_found(RecordKind::Order, 5);
        assert!(matches!(
            err,
            DomainError::NotFound {
                kind: RecordKind::Order,
                id: 5
            }
        ));
    }
}
