//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to read users without
//! importing outbound persistence concerns.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, PaginatedUsers, User, UserId};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return one page of active users together with the active total.
    async fn list_users(&self, page: PageRequest) -> Result<PaginatedUsers, Error>;

    /// Return the active user with the given identifier.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;
}
