//! Backend entry-point: loads settings, wires the user service and serves
//! the REST endpoints until SIGINT or SIGTERM.

mod server;

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, build_http_state, create_server};
use users_backend::config::ServerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let config = ServerConfig::from_settings(&settings).wrap_err("invalid server settings")?;
    let http_state = build_http_state(&settings).await?;

    info!(bind_addr = %config.bind_addr(), in_memory = settings.in_memory, "starting server");
    create_server(http_state, config)
        .wrap_err("failed to start HTTP server")?
        .await
        .wrap_err("HTTP server terminated with an error")?;
    info!("server stopped");
    Ok(())
}
