//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every statement carries `deleted_at IS NULL`, so soft-deleted rows are
//! neither returned nor modified. Updates and deletes derive existence from
//! the affected-row count. Each operation, including connection checkout, is
//! bounded by the execution timeout; dropping the returned future cancels the
//! in-flight query.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use mockable::{Clock, DefaultClock};
use pagination::PageRequest;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AUDIT_ACTION_CREATE, User, UserDraft, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewAuditLogRow, NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::{audit_logs, users};

/// Upper bound applied to each repository operation unless overridden.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Diesel-backed implementation of the [`UserRepository`] port.
///
/// Timestamps come from the injected clock rather than the database so tests
/// can pin them.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    execution_timeout: Duration,
}

impl DieselUserRepository {
    /// Create a repository using the system clock and the default timeout.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            clock: Arc::new(DefaultClock),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }

    /// Replace the clock used for `created_at` and `deleted_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the per-operation execution timeout.
    #[must_use]
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, operation: &'static str, work: F) -> Result<T, UserPersistenceError>
    where
        F: Future<Output = Result<T, UserPersistenceError>>,
    {
        with_timeout(self.execution_timeout, operation, work).await
    }
}

/// Run `work`, failing with [`UserPersistenceError::Timeout`] after `limit`.
async fn with_timeout<T, F>(
    limit: Duration,
    operation: &'static str,
    work: F,
) -> Result<T, UserPersistenceError>
where
    F: Future<Output = Result<T, UserPersistenceError>>,
{
    if let Ok(result) = tokio::time::timeout(limit, work).await {
        result
    } else {
        warn!(
            operation,
            timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            "user repository operation timed out"
        );
        Err(UserPersistenceError::timeout(operation))
    }
}

async fn insert_user(
    conn: &mut AsyncPgConnection,
    draft: &UserDraft,
    created_at: DateTime<Utc>,
) -> Result<i64, diesel::result::Error> {
    diesel::insert_into(users::table)
        .values(&NewUserRow {
            name: &draft.name,
            email: &draft.email,
            created_at,
        })
        .returning(users::id)
        .get_result(conn)
        .await
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        self.bounded("list_users", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<UserRow> = users::table
                .filter(users::deleted_at.is_null())
                .order(users::id.asc())
                .limit(page.limit())
                .offset(page.offset())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "list_users"))?;
            Ok(rows.into_iter().map(User::from).collect())
        })
        .await
    }

    async fn count_users(&self) -> Result<i64, UserPersistenceError> {
        self.bounded("count_users", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            users::table
                .filter(users::deleted_at.is_null())
                .count()
                .get_result::<i64>(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "count_users"))
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, UserPersistenceError> {
        self.bounded("find_by_id", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row: Option<UserRow> = users::table
                .filter(users::id.eq(id.as_i64()))
                .filter(users::deleted_at.is_null())
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, "find_by_id"))?;
            row.map(User::from)
                .ok_or_else(|| UserPersistenceError::missing(id))
        })
        .await
    }

    async fn create(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError> {
        self.bounded("create", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let id = insert_user(&mut conn, draft, self.clock.utc())
                .await
                .map_err(|err| map_diesel_error(err, "create"))?;
            Ok(UserId::new(id))
        })
        .await
    }

    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<(), UserPersistenceError> {
        self.bounded("update", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let affected = diesel::update(
                users::table
                    .filter(users::id.eq(id.as_i64()))
                    .filter(users::deleted_at.is_null()),
            )
            .set(&UserChangeset {
                name: &draft.name,
                email: &draft.email,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update"))?;

            if affected == 0 {
                return Err(UserPersistenceError::missing(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.bounded("delete", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let affected = diesel::update(
                users::table
                    .filter(users::id.eq(id.as_i64()))
                    .filter(users::deleted_at.is_null()),
            )
            .set(users::deleted_at.eq(Some(self.clock.utc())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete"))?;

            if affected == 0 {
                return Err(UserPersistenceError::missing(id));
            }
            Ok(())
        })
        .await
    }

    async fn create_with_audit(&self, draft: &UserDraft) -> Result<UserId, UserPersistenceError> {
        self.bounded("create_with_audit", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let now = self.clock.utc();
            let id = conn
                .transaction::<i64, diesel::result::Error, _>(|conn| {
                    async move {
                        let id = insert_user(conn, draft, now).await?;
                        diesel::insert_into(audit_logs::table)
                            .values(&NewAuditLogRow {
                                user_id: id,
                                action: AUDIT_ACTION_CREATE,
                                created_at: now,
                            })
                            .execute(conn)
                            .await?;
                        Ok(id)
                    }
                    .scope_boxed()
                })
                .await
                .map_err(|err| map_diesel_error(err, "create_with_audit"))?;
            Ok(UserId::new(id))
        })
        .await
    }
}
