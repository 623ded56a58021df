//! OpenAPI schemas for the domain types served over HTTP.
//!
//! The domain module stays free of utoipa. These wrappers mirror the JSON
//! shape of each domain type and register under the domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The API key is missing or wrong.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The user does not exist or has been deleted.
    #[schema(rename = "not_found")]
    NotFound,
    /// The e-mail already belongs to another user.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store failed or timed out.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    #[schema(example = "user 7 not found")]
    message: String,
    /// Structured context, e.g. the rejected field.
    #[schema(value_type = Option<Object>, example = json!({"field": "email", "code": "empty_email"}))]
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserSchema {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "Ada Lovelace")]
    name: String,
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(value_type = String, format = DateTime, example = "2026-10-01T12:00:00Z")]
    created_at: String,
    /// Present only on deleted users, which the API never returns.
    #[schema(value_type = Option<String>, format = DateTime)]
    deleted_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::PaginatedUsers`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PaginatedUsers)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct PaginatedUsersSchema {
    users: Vec<UserSchema>,
    /// Count of all active users.
    #[schema(example = 42)]
    total: i64,
    #[schema(example = 10, minimum = 1, maximum = 100)]
    limit: i64,
    #[schema(example = 0, minimum = 0)]
    offset: i64,
}
