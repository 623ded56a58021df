//! Outbound adapters implementing the `UserRepository` port.
//!
//! - **persistence**: PostgreSQL via Diesel, `diesel-async` and `bb8`.
//! - **memory**: mutex-guarded map for local runs and tests.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod memory;
pub mod persistence;
