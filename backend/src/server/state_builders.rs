//! Builders for the HTTP state and the repository behind it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};

use users_backend::config::{CONNECT_RETRY_DELAY, ServerSettings};
use users_backend::domain::UserService;
use users_backend::inbound::http::state::HttpState;
use users_backend::outbound::memory::InMemoryUserRepository;
use users_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, PoolError};

/// Build handler state backed by PostgreSQL, or by the in-memory repository
/// when `in_memory` is set.
///
/// # Errors
///
/// Returns an error when the database settings are invalid or the database
/// stays unreachable for every attempt.
pub async fn build_http_state(settings: &ServerSettings) -> Result<web::Data<HttpState>> {
    if settings.in_memory {
        info!("using in-memory user repository");
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        return Ok(web::Data::new(HttpState::from_service(Arc::new(service))));
    }

    let config = PoolConfig::new(settings.database_url()?).with_max_size(settings.db_max_size());
    let pool = retry(settings.connect_retries(), CONNECT_RETRY_DELAY, || {
        connect(config.clone())
    })
    .await
    .map_err(|err| eyre!("database unreachable: {err}"))?;

    let repository =
        DieselUserRepository::new(pool).with_execution_timeout(settings.execution_timeout());
    let service = UserService::new(Arc::new(repository));
    Ok(web::Data::new(HttpState::from_service(Arc::new(service))))
}

async fn connect(config: PoolConfig) -> Result<DbPool, PoolError> {
    let pool = DbPool::new(config).await?;
    pool.ping().await?;
    Ok(pool)
}

/// Call `attempt` up to `attempts` times, sleeping `delay` between failures.
async fn retry<T, E, F, Fut>(attempts: u32, delay: Duration, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut tried = 1;
    loop {
        match attempt().await {
            Ok(value) => {
                info!(attempt = tried, "database connection established");
                return Ok(value);
            }
            Err(err) if tried < attempts => {
                warn!(attempt = tried, attempts, error = %err, "database not ready, retrying");
                tried += 1;
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
