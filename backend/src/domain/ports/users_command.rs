//! Driving port for user mutations.
//!
//! Implementations validate profile data before touching storage and report
//! failures through the domain [`Error`] taxonomy.

use async_trait::async_trait;

use crate::domain::{Error, UserDraft, UserId};

/// Domain use-case port for creating, updating, and soft-deleting users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user and return its identifier.
    async fn create_user(&self, draft: UserDraft) -> Result<UserId, Error>;

    /// Replace the name and e-mail of an active user.
    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<(), Error>;

    /// Soft-delete an active user.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;

    /// Create a user and its `create` audit entry atomically.
    async fn create_user_with_audit(&self, draft: UserDraft) -> Result<UserId, Error>;
}
