//! User data model.
//!
//! A [`User`] is active while `deleted_at` is `None`. Soft-deleted users keep
//! their row but are invisible to every read and write the domain performs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};

/// Audit action recorded when a user is created through the audited path.
pub const AUDIT_ACTION_CREATE: &str = "create";

/// Validation errors raised for user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The supplied identifier was not a positive integer.
    #[error("user id must be a positive integer")]
    InvalidId,
    /// The name was empty or whitespace only.
    #[error("name must not be empty")]
    EmptyName,
    /// The e-mail address was empty or whitespace only.
    #[error("email must not be empty")]
    EmptyEmail,
}

impl UserValidationError {
    /// Field the error refers to, for structured error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyName => "name",
            Self::EmptyEmail => "email",
        }
    }

    /// Stable machine-readable code for the violation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyName => "empty_name",
            Self::EmptyEmail => "empty_email",
        }
    }
}

/// Store-assigned surrogate key of a user.
///
/// # Examples
/// ```
/// use users_backend::domain::UserId;
///
/// let id: UserId = "42".parse().expect("valid id");
/// assert_eq!(id.as_i64(), 42);
/// assert!("0".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier produced by the store.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(UserValidationError::InvalidId),
        }
    }
}

/// Caller-supplied profile fields used to create or update a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name; must be non-empty.
    pub name: String,
    /// Contact e-mail; must be non-empty, format is not checked.
    pub email: String,
}

impl UserDraft {
    /// Build a draft from name and e-mail.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Check the business rules for user profile data.
    ///
    /// # Examples
    /// ```
    /// use users_backend::domain::{UserDraft, UserValidationError};
    ///
    /// assert!(UserDraft::new("Ada", "ada@example.com").validate().is_ok());
    /// assert_eq!(
    ///     UserDraft::new("  ", "ada@example.com").validate(),
    ///     Err(UserValidationError::EmptyName)
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if self.email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(())
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker; `None` while the user is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the user has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Append-only record of a mutating action on a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// User the action applied to.
    pub user_id: UserId,
    /// Free-form action tag, e.g. [`AUDIT_ACTION_CREATE`].
    pub action: String,
    /// When the action was recorded.
    pub created_at: DateTime<Utc>,
}

/// One page of active users plus the total active count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedUsers {
    /// Users in the requested window, ordered by id ascending.
    pub users: Vec<User>,
    /// Count of all active users.
    pub total: i64,
    /// Limit echoed from the request.
    pub limit: i64,
    /// Offset echoed from the request.
    pub offset: i64,
}

impl PaginatedUsers {
    /// Compose a page from fetched users, the active total, and the request.
    pub fn new(users: Vec<User>, total: i64, page: PageRequest) -> Self {
        Self {
            users,
            total,
            limit: page.limit(),
            offset: page.offset(),
        }
    }
}
