//! Unauthenticated liveness endpoint.

use actix_web::{HttpResponse, get};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(value_type = String, example = "ok")]
    status: &'static str,
}

/// Report that the process is serving requests.
///
/// ```text
/// GET /health -> 200 {"status":"ok"}
/// ```
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up", body = HealthStatus)),
    tags = ["health"],
    operation_id = "health",
    security([])
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus { status: "ok" })
}
