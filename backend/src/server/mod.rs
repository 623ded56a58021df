//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use users_backend::doc::ApiDoc;
use users_backend::inbound::http::health::health;
use users_backend::inbound::http::state::HttpState;
use users_backend::inbound::http::{json_config, users};
use users_backend::{ApiKey, Trace};

/// Compose the application: `/health` and the API docs are open, every
/// users route sits behind the API key, and [`Trace`] wraps everything.
fn build_app(
    http_state: web::Data<HttpState>,
    api_key: ApiKey,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(health)
        .service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .service(web::scope("").wrap(api_key).configure(users::configure))
}

/// Construct an Actix HTTP server from prepared state and configuration.
///
/// Actix installs SIGINT/SIGTERM handlers and drains in-flight requests
/// before the returned [`Server`] resolves.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig { bind_addr, api_key } = config;
    let server = HttpServer::new(move || build_app(http_state.clone(), api_key.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
