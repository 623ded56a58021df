//! Embedded PostgreSQL helpers shared by the Diesel integration suites.
//!
//! - Schemas come from the embedded Diesel migrations so tests never drift
//!   from `backend/migrations`.
//! - Table teardown uses `postgres` directly to simulate schema loss.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Create a fresh database on `cluster` with every migration applied.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let name = format!("users_test_{}", Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create database {name}: {err:?}"))?;
    migrate_schema(database.url())?;
    Ok(database)
}

/// Run all pending migrations against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Drop the `audit_logs` table so audited inserts fail part-way through.
pub fn drop_audit_logs_table(url: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute("DROP TABLE IF EXISTS audit_logs;")
        .map_err(|err| format_postgres_error(&err))
}

/// Count every row in `users`, soft-deleted ones included.
pub fn count_all_user_rows(url: &str) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one("SELECT COUNT(*) FROM users", &[])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}

/// Read `(user_id, action)` for every audit entry, oldest first.
pub fn audit_rows(url: &str) -> Result<Vec<(i64, String)>, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let rows = client
        .query("SELECT user_id, action FROM audit_logs ORDER BY id", &[])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(rows.iter().map(|row| (row.get(0), row.get(1))).collect())
}

/// Read `deleted_at` of one row as Unix seconds, soft-deleted or not.
pub fn deleted_at_seconds(url: &str, id: i64) -> Result<Option<i64>, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(
            "SELECT EXTRACT(EPOCH FROM deleted_at)::BIGINT FROM users WHERE id = $1",
            &[&id],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
