//! User service implementing the driving ports.
//!
//! Validation happens before any repository call. Repository failures are
//! forwarded by kind: `NotFound` stays `NotFound`, everything else becomes an
//! internal error whose storage detail is logged, never returned.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;
use tracing::{debug, error};

use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::{Error, PaginatedUsers, User, UserDraft, UserId};

/// Business component orchestrating user reads and writes.
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a new service over the given repository.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use users_backend::domain::UserService;
    /// # use users_backend::outbound::memory::InMemoryUserRepository;
    /// let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
    /// # let _ = service;
    /// ```
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::NotFound { id } => Error::user_not_found(id),
            UserPersistenceError::Conflict { operation, message } => {
                debug!(%operation, %message, "user repository reported a conflict");
                Error::conflict("user already exists")
            }
            other => {
                error!(error = %other, "user repository failure");
                Error::internal("user repository error")
            }
        }
    }

    fn validate(draft: &UserDraft) -> Result<(), Error> {
        draft.validate().map_err(Error::from)
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self, page: PageRequest) -> Result<PaginatedUsers, Error> {
        let users = self
            .repo
            .list_users(page)
            .await
            .map_err(Self::map_persistence_error)?;
        let total = self
            .repo
            .count_users()
            .await
            .map_err(Self::map_persistence_error)?;
        Ok(PaginatedUsers::new(users, total, page))
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, draft: UserDraft) -> Result<UserId, Error> {
        Self::validate(&draft)?;
        self.repo
            .create(&draft)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn update_user(&self, id: UserId, draft: UserDraft) -> Result<(), Error> {
        Self::validate(&draft)?;
        self.repo
            .update(id, &draft)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        self.repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn create_user_with_audit(&self, draft: UserDraft) -> Result<UserId, Error> {
        Self::validate(&draft)?;
        self.repo
            .create_with_audit(&draft)
            .await
            .map_err(Self::map_persistence_error)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
