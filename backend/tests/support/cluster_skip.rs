//! Skip policy for suites that need the embedded PostgreSQL cluster.
//!
//! Hosts without the PostgreSQL binaries (or without network access to
//! fetch them) skip these suites with a `SKIP-TEST-CLUSTER` marker. CI sets
//! `REQUIRE_TEST_CLUSTER=1` so a broken cluster fails loudly instead.

/// Returns true when `REQUIRE_TEST_CLUSTER` is `1`, `true` or `yes`.
pub fn cluster_required() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a cluster setup failure according to the skip policy.
///
/// Prints the skip marker and returns `None` unless the cluster is required,
/// in which case it panics with `reason`.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if cluster_required() {
        panic!("Test cluster setup failed: {reason}. Unset REQUIRE_TEST_CLUSTER to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;

    #[test]
    fn skips_by_default() {
        let _guard = lock_env([("REQUIRE_TEST_CLUSTER", None::<&str>)]);

        assert_eq!(handle_cluster_setup_failure::<()>("no binaries"), None);
    }

    #[test]
    #[should_panic(expected = "Test cluster setup failed")]
    fn panics_when_required() {
        let _guard = lock_env([("REQUIRE_TEST_CLUSTER", Some("yes"))]);

        let _ = handle_cluster_setup_failure::<()>("no binaries");
    }
}
