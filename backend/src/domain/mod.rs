//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed user entities and the use-case services
//! that operate on them. Types here never depend on HTTP or Diesel; adapters
//! translate to and from them at the edges.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User, UserDraft, UserId: the user aggregate and its inputs.
//! - UserService: validation plus orchestration over a `UserRepository`.

pub mod error;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::user::{
    AUDIT_ACTION_CREATE, AuditLogEntry, PaginatedUsers, User, UserDraft, UserId,
    UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use users_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("user 1 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
