//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User accounts. A non-null `deleted_at` marks a soft-deleted row.
    users (id) {
        /// Store-assigned surrogate key.
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        /// Set once at insert.
        created_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only audit trail of user mutations.
    audit_logs (id) {
        id -> Int8,
        user_id -> Int8,
        /// Free-form action tag such as `create`.
        action -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(audit_logs -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(audit_logs, users);
