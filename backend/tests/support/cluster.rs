//! Access to the process-wide embedded PostgreSQL cluster.

use std::any::Any;
use std::panic;
use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Return the shared cluster, bootstrapping it on first use.
///
/// Bootstrap errors are retried a few times since the first run may still be
/// downloading PostgreSQL binaries when a parallel suite asks for it. A panic
/// raised by the bootstrap (for example a missing worker under root) is
/// reported as an error so callers can apply the skip policy.
pub fn shared_cluster_handle() -> Result<&'static ClusterHandle, String> {
    ensure_bootstrap_environment();
    let mut attempt = 1;
    loop {
        match panic::catch_unwind(pg_embedded_setup_unpriv::test_support::shared_cluster_handle) {
            Ok(Ok(handle)) => return Ok(handle),
            Ok(Err(error)) if attempt >= SHARED_CLUSTER_RETRIES => {
                return Err(format!("cluster bootstrap failed: {error:?}"));
            }
            Ok(Err(_)) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(payload) => {
                return Err(format!("cluster bootstrap panicked: {}", panic_text(&*payload)));
            }
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload")
}

/// Pin `PG_PASSWORD` so a data directory reused across test binaries keeps
/// accepting the password it was initialised with, and point
/// `PG_EMBEDDED_WORKER` at the `pg_worker` helper built with this package.
fn ensure_bootstrap_environment() {
    let defaults = [
        ("PG_PASSWORD", "users_embedded_test"),
        ("PG_EMBEDDED_WORKER", env!("CARGO_BIN_EXE_pg_worker")),
    ];
    for (key, value) in defaults {
        if std::env::var_os(key).is_none() {
            // SAFETY: runs before the cluster bootstrap spawns any threads and
            // the library serialises bootstrap behind its own lock.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_text_reads_both_payload_kinds() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("worker missing"));
        let borrowed: Box<dyn Any + Send> = Box::new("worker missing");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_text(&*owned), "worker missing");
        assert_eq!(panic_text(&*borrowed), "worker missing");
        assert_eq!(panic_text(&*other), "non-string panic payload");
    }

    #[test]
    fn existing_password_is_kept() {
        let _guard = env_lock::lock_env([("PG_PASSWORD", Some("custom_value"))]);

        ensure_bootstrap_environment();

        assert_eq!(
            std::env::var("PG_PASSWORD").expect("PG_PASSWORD set"),
            "custom_value"
        );
    }
}
