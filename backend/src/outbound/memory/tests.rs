//! Behavioural coverage for the in-memory user repository.

use super::*;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{TimeDelta, TimeZone};
use mockable::MockClock;
use rstest::{fixture, rstest};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn repo() -> InMemoryUserRepository {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(fixed_time());
    InMemoryUserRepository::with_clock(Arc::new(clock))
}

/// Clock advancing one second per reading, starting at [`fixed_time`].
#[fixture]
fn ticking_repo() -> InMemoryUserRepository {
    let ticks = Arc::new(AtomicI64::new(0));
    let mut clock = MockClock::new();
    clock
        .expect_utc()
        .returning(move || fixed_time() + TimeDelta::seconds(ticks.fetch_add(1, Ordering::SeqCst)));
    InMemoryUserRepository::with_clock(Arc::new(clock))
}

fn tick(n: i64) -> DateTime<Utc> {
    fixed_time() + TimeDelta::seconds(n)
}

fn page(limit: i64, offset: i64) -> PageRequest {
    PageRequest::new(limit, offset).expect("valid page")
}

async fn seed(repo: &InMemoryUserRepository, name: &str, email: &str) -> UserId {
    repo.create(&UserDraft::new(name, email))
        .await
        .expect("insert succeeds")
}

#[rstest]
#[tokio::test]
async fn create_then_find_round_trips(repo: InMemoryUserRepository) {
    let id = seed(&repo, "Alice", "a@x").await;

    let user = repo.find_by_id(id).await.expect("user exists");

    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "a@x");
    assert_eq!(user.created_at, fixed_time());
    assert!(user.deleted_at.is_none());
}

#[rstest]
#[tokio::test]
async fn ids_are_monotonic(repo: InMemoryUserRepository) {
    let first = seed(&repo, "Alice", "a@x").await;
    let second = seed(&repo, "Bob", "b@x").await;
    repo.delete(second).await.expect("delete succeeds");
    let third = seed(&repo, "Carol", "c@x").await;

    assert_eq!(first, UserId::new(1));
    assert_eq!(second, UserId::new(2));
    assert_eq!(third, UserId::new(3));
}

#[rstest]
#[tokio::test]
async fn empty_store_lists_nothing(repo: InMemoryUserRepository) {
    assert!(repo.list_users(page(10, 0)).await.expect("list").is_empty());
    assert_eq!(repo.count_users().await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn pagination_and_soft_delete_scenario(repo: InMemoryUserRepository) {
    let alice = seed(&repo, "Alice", "a@x").await;
    let bob = seed(&repo, "Bob", "b@x").await;

    let first = repo.list_users(page(1, 0)).await.expect("first page");
    let second = repo.list_users(page(1, 1)).await.expect("second page");
    assert_eq!(first.iter().map(|u| u.id).collect::<Vec<_>>(), vec![alice]);
    assert_eq!(second.iter().map(|u| u.id).collect::<Vec<_>>(), vec![bob]);
    assert_eq!(repo.count_users().await.expect("count"), 2);

    repo.delete(alice).await.expect("delete alice");

    let remaining = repo.list_users(page(10, 0)).await.expect("list");
    assert_eq!(remaining.iter().map(|u| u.id).collect::<Vec<_>>(), vec![bob]);
    assert_eq!(repo.count_users().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn zero_limit_yields_empty_page(repo: InMemoryUserRepository) {
    seed(&repo, "Alice", "a@x").await;

    assert!(repo.list_users(page(0, 0)).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn soft_deleted_users_are_invisible(repo: InMemoryUserRepository) {
    let id = seed(&repo, "Alice", "a@x").await;
    repo.delete(id).await.expect("delete succeeds");

    assert_eq!(
        repo.find_by_id(id).await,
        Err(UserPersistenceError::missing(id))
    );
    assert_eq!(
        repo.update(id, &UserDraft::new("Alicia", "a@y")).await,
        Err(UserPersistenceError::missing(id))
    );
    assert_eq!(repo.delete(id).await, Err(UserPersistenceError::missing(id)));

    let rows = repo.all_rows();
    assert_eq!(rows.len(), 1, "soft delete keeps the row");
    assert_eq!(rows[0].deleted_at, Some(fixed_time()));
    assert_eq!(rows[0].name, "Alice", "failed update left the row untouched");
}

#[rstest]
#[tokio::test]
async fn update_overwrites_profile_only(repo: InMemoryUserRepository) {
    let id = seed(&repo, "Alice", "a@x").await;

    repo.update(id, &UserDraft::new("Alicia", "alicia@x"))
        .await
        .expect("update succeeds");

    let user = repo.find_by_id(id).await.expect("user exists");
    assert_eq!(user.name, "Alicia");
    assert_eq!(user.email, "alicia@x");
    assert_eq!(user.created_at, fixed_time());
    assert!(user.is_active());
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_id_has_no_side_effects(repo: InMemoryUserRepository) {
    seed(&repo, "Alice", "a@x").await;

    let result = repo.update(UserId::new(42), &UserDraft::new("X", "x@x")).await;

    assert_eq!(result, Err(UserPersistenceError::not_found(42)));
    assert_eq!(repo.count_users().await.expect("count"), 1);
    assert_eq!(repo.all_rows()[0].name, "Alice");
}

#[rstest]
#[tokio::test]
async fn concurrent_deletes_succeed_exactly_once(ticking_repo: InMemoryUserRepository) {
    let id = seed(&ticking_repo, "Alice", "a@x").await;
    let left = ticking_repo.clone();
    let right = ticking_repo.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { left.delete(id).await }),
        tokio::spawn(async move { right.delete(id).await }),
    );
    let outcomes = [a.expect("task a"), b.expect("task b")];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| *r == Err(UserPersistenceError::missing(id)))
    );
    let deleted_at = ticking_repo.all_rows()[0].deleted_at;
    assert!(
        deleted_at == Some(tick(1)) || deleted_at == Some(tick(2)),
        "deleted_at comes from one of the racing deletes: {deleted_at:?}"
    );

    assert_eq!(
        ticking_repo.delete(id).await,
        Err(UserPersistenceError::missing(id))
    );
    assert_eq!(ticking_repo.all_rows()[0].deleted_at, deleted_at);
}

#[rstest]
#[tokio::test]
async fn repeated_delete_keeps_first_timestamp(ticking_repo: InMemoryUserRepository) {
    let id = seed(&ticking_repo, "Alice", "a@x").await;

    ticking_repo.delete(id).await.expect("first delete succeeds");
    let second = ticking_repo.delete(id).await;

    assert_eq!(second, Err(UserPersistenceError::missing(id)));
    let row = &ticking_repo.all_rows()[0];
    assert_eq!(row.created_at, tick(0));
    assert_eq!(row.deleted_at, Some(tick(1)));
}

#[rstest]
#[tokio::test]
async fn create_with_audit_records_both_entries(repo: InMemoryUserRepository) {
    let id = repo
        .create_with_audit(&UserDraft::new("Alice", "a@x"))
        .await
        .expect("audited insert succeeds");

    let entries = repo.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, id);
    assert_eq!(entries[0].action, AUDIT_ACTION_CREATE);
    assert_eq!(entries[0].created_at, fixed_time());
    assert!(repo.find_by_id(id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn failed_audit_persists_neither_row(repo: InMemoryUserRepository) {
    repo.fail_audit_writes(true);

    let result = repo
        .create_with_audit(&UserDraft::new("Alice", "a@x"))
        .await;

    assert!(matches!(result, Err(UserPersistenceError::Query { .. })));
    assert!(repo.all_rows().is_empty());
    assert!(repo.audit_entries().is_empty());
    assert_eq!(repo.count_users().await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn failed_audit_rolls_back_an_inserted_user(repo: InMemoryUserRepository) {
    repo.fail_audit_writes(true);
    let failed = repo
        .create_with_audit(&UserDraft::new("Alice", "a@x"))
        .await;
    assert!(failed.is_err());
    repo.fail_audit_writes(false);

    let id = seed(&repo, "Bob", "b@x").await;

    assert_eq!(id, UserId::new(2), "the rolled-back insert consumed id 1");
    assert_eq!(
        repo.find_by_id(UserId::new(1)).await,
        Err(UserPersistenceError::not_found(1))
    );
    assert_eq!(repo.all_rows().len(), 1);
}

#[rstest]
#[tokio::test]
async fn plain_create_writes_no_audit_entry(repo: InMemoryUserRepository) {
    seed(&repo, "Alice", "a@x").await;

    assert!(repo.audit_entries().is_empty());
}
