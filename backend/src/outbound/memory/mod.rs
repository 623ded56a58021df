//! In-memory `UserRepository` for local development and tests.
//!
//! Mirrors the PostgreSQL adapter: ids are assigned monotonically, soft
//! deleted users are filtered from every operation, and `create_with_audit`
//! writes both entries under one lock acquisition, removing the user again
//! when the audit write fails, so no reader observes one without the other.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use pagination::PageRequest;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AUDIT_ACTION_CREATE, AuditLogEntry, User, UserDraft, UserId};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, User>,
    audit_log: Vec<AuditLogEntry>,
    fail_audit_writes: bool,
}

impl State {
    fn active(&self, id: UserId) -> Option<&User> {
        self.users.get(&id.as_i64()).filter(|user| user.is_active())
    }

    fn active_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users
            .get_mut(&id.as_i64())
            .filter(|user| user.is_active())
    }
}

/// Mutex-guarded map of users plus the audit trail.
///
/// Clones share state.
///
/// # Examples
/// ```
/// use users_backend::domain::UserDraft;
/// use users_backend::domain::ports::UserRepository;
/// use users_backend::outbound::memory::InMemoryUserRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = InMemoryUserRepository::new();
/// let id = repo
///     .create(&UserDraft::new("Ada", "ada@example.com"))
///     .await
///     .expect("insert succeeds");
/// let user = repo.find_by_id(id).await.expect("user is active");
/// assert_eq!(user.name, "Ada");
/// # });
/// ```
#[derive(Clone)]
pub struct InMemoryUserRepository {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Create an empty repository using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty repository with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    /// Snapshot of the recorded audit entries in insertion order.
    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.lock().map(|state| state.audit_log.clone()).unwrap_or_default()
    }

    /// Make subsequent audit writes fail, simulating a broken audit table.
    pub fn fail_audit_writes(&self, fail: bool) {
        if let Ok(mut state) = self.lock() {
            state.fail_audit_writes = fail;
        }
    }

    /// Every stored row, soft-deleted ones included, ordered by id.
    pub fn all_rows(&self) -> Vec<User> {
        self.lock()
            .map(|state| state.users.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, UserPersistenceError> {
        self.state
            .lock()
            .map_err(|_| UserPersistenceError::connection("in-memory user store is poisoned"))
    }

    fn insert(state: &mut State, draft: &UserDraft, created_at: DateTime<Utc>) -> UserId {
        state.last_id += 1;
        let id = UserId::new(state.last_id);
        state.users.insert(
            id.as_i64(),
            User {
                id,
                name: draft.name.clone(),
                email: draft.email.clone(),
                created_at,
                deleted_at: None,
            },
        );
        id
    }

    fn record_audit(
        state: &mut State,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        if state.fail_audit_writes {
            return Err(UserPersistenceError::query(
                "create_with_audit",
                "audit log unavailable",
            ));
        }
        state.audit_log.push(AuditLogEntry {
            user_id,
            action: AUDIT_ACTION_CREATE.to_owned(),
            created_at,
        });
        Ok(())
    }
}

fn window(page: PageRequest) -> (usize, usize) {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(0);
    (offset, limit)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock()?;
        let (offset, limit) = window(page);
        Ok(state
            .users
            .values()
            .filter(|user| user.is_active())
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_users(&self) -> Result<i64, UserPersistenceError> {
        let state = self.lock()?;
        let active = state.users.values().filter(|user| user.is_active()).count();
        i64::try_from(active).map_err(|err| UserPersistenceError::query("count_users", err.to_string()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, UserPersistenceError> {
        let state = self.lock()?;
        state
            .active(id)
            .cloned()
            .ok_or_else(|| UserPersistenceError::missing(id))
    }

    async fn create(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock()?;
        Ok(Self::insert(&mut state, draft, created_at))
    }

    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        let user = state
            .active_mut(id)
            .ok_or_else(|| UserPersistenceError::missing(id))?;
        user.name.clone_from(&draft.name);
        user.email.clone_from(&draft.email);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.lock()?;
        let user = state
            .active_mut(id)
            .ok_or_else(|| UserPersistenceError::missing(id))?;
        user.deleted_at = Some(now);
        Ok(())
    }

    async fn create_with_audit(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock()?;
        let id = Self::insert(&mut state, draft, created_at);
        if let Err(err) = Self::record_audit(&mut state, id, created_at) {
            // The id stays consumed, like a sequence value after rollback.
            state.users.remove(&id.as_i64());
            return Err(err);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests;
