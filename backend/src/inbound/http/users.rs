//! Users API handlers.
//!
//! ```text
//! GET    /users?limit=10&offset=0
//! GET    /users/{id}
//! POST   /users        {"name":"Ada","email":"ada@example.com"}
//! POST   /users/audit  {"name":"Ada","email":"ada@example.com"}
//! PUT    /users/{id}   {"name":"Ada","email":"ada@example.com"}
//! DELETE /users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, PaginatedUsers, User, UserDraft, UserId, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PaginatedUsersSchema, UserSchema};
use crate::inbound::http::state::HttpState;

/// Raw pagination query; values are clamped rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListUsersQuery {
    fn page(&self) -> PageRequest {
        PageRequest::from_query(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// Request body for create and update.
///
/// Missing fields deserialise as empty strings and fail validation.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserInput {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl From<UserInput> for UserDraft {
    fn from(value: UserInput) -> Self {
        UserDraft::new(value.name, value.email)
    }
}

/// Body returned after a successful create.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedUser {
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse()
        .map_err(|err: UserValidationError| Error::invalid_field("invalid user ID", &err))
}

/// List active users one page at a time.
#[utoipa::path(
    get,
    path = "/users",
    params(
        ("limit" = Option<i64>, Query, description = "Page size; defaults to 10, capped at 100"),
        ("offset" = Option<i64>, Query, description = "Users to skip; negatives read as 0")
    ),
    responses(
        (status = 200, description = "One page of active users", body = PaginatedUsersSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 500, description = "Store failure or timeout", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<PaginatedUsers>> {
    let page = state.users_query.list_users(query.page()).await?;
    Ok(web::Json(page))
}

/// Fetch one active user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The user", body = UserSchema),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "Unknown or deleted user", body = ErrorSchema),
        (status = 500, description = "Store failure or timeout", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(id).await?;
    Ok(web::Json(user))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = CreatedUser),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 409, description = "E-mail already taken", body = ErrorSchema),
        (status = 500, description = "Store failure or timeout", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let id = state
        .users_command
        .create_user(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(CreatedUser { id }))
}

/// Create a user together with its `create` audit entry.
#[utoipa::path(
    post,
    path = "/users/audit",
    request_body = UserInput,
    responses(
        (status = 201, description = "User and audit entry created", body = CreatedUser),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 409, description = "E-mail already taken", body = ErrorSchema),
        (status = 500, description = "Neither row was written", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUserWithAudit"
)]
#[post("/users/audit")]
pub async fn create_user_with_audit(
    state: web::Data<HttpState>,
    payload: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let id = state
        .users_command
        .create_user_with_audit(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(CreatedUser { id }))
}

/// Replace name and e-mail of an active user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserInput,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Malformed id or body", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "Unknown or deleted user", body = ErrorSchema),
        (status = 409, description = "E-mail already taken", body = ErrorSchema),
        (status = 500, description = "Store failure or timeout", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserInput>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state
        .users_command
        .update_user(id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "user updated" })))
}

/// Soft-delete an active user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Missing or wrong API key", body = ErrorSchema),
        (status = 404, description = "Unknown or already deleted user", body = ErrorSchema),
        (status = 500, description = "Store failure or timeout", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users_command.delete_user(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every users route on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use users_backend::inbound::http::users;
///
/// let _app = App::new().service(web::scope("").configure(users::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(create_user_with_audit)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}
