//! Request middleware.
//!
//! [`Trace`] correlates and logs requests; [`ApiKey`] guards the users
//! routes with a shared secret.

pub mod api_key;
pub mod trace;

pub use api_key::ApiKey;
pub use trace::Trace;
