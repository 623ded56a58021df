//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Repositories here only translate between Diesel rows and domain types.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module. Connections come from a `bb8` pool driven by
//! `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use users_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn demo() -> Result<(), users_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://postgres@localhost/mydb")).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::{DEFAULT_EXECUTION_TIMEOUT, DieselUserRepository};
pub use pool::{DbPool, PoolConfig, PoolError};
