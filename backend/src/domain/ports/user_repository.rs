//! Port abstraction for user persistence adapters and their errors.
//!
//! Every operation acts on *active* users only: a row whose `deleted_at` is
//! set is invisible to reads and unmatched by writes. Adapters enforce this
//! with a mandatory predicate on each statement rather than in callers.
//!
//! `update` and `delete` report [`UserPersistenceError::NotFound`] when the
//! write touched zero rows, so absence is detected without a prior read.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{User, UserDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// No active user matched the identifier.
        NotFound { id: i64 } => "user {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { operation: String, message: String } =>
            "user repository {operation} failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { operation: String, message: String } =>
            "user repository {operation} conflicted: {message}",
        /// The operation did not complete within the execution timeout.
        Timeout { operation: String } => "user repository {operation} timed out",
    }
}

impl UserPersistenceError {
    /// Shorthand for [`UserPersistenceError::NotFound`] keyed by a [`UserId`].
    pub fn missing(id: UserId) -> Self {
        Self::not_found(id.as_i64())
    }
}

/// Data access capability for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch active users ordered by id ascending within the page window.
    ///
    /// The window is trusted as already sanitised; a zero limit yields an
    /// empty vector.
    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError>;

    /// Count active users.
    async fn count_users(&self) -> Result<i64, UserPersistenceError>;

    /// Fetch an active user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<User, UserPersistenceError>;

    /// Insert a user, assigning its id and creation time.
    ///
    /// No profile validation happens here.
    async fn create(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError>;

    /// Overwrite name and e-mail of an active user.
    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<(), UserPersistenceError>;

    /// Soft-delete an active user. Deleting twice reports `NotFound`.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;

    /// Insert a user and a `create` audit entry as one atomic unit.
    ///
    /// Either both rows persist or neither does.
    async fn create_with_audit(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError>;
}
