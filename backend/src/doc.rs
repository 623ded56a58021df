//! OpenAPI document for the users API.
//!
//! Every users route requires the `X-API-KEY` header, registered here as the
//! `ApiKeyAuth` scheme. `/health` opts out. The document is served at
//! `/api-docs/openapi.json` next to a Swagger UI at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, PaginatedUsersSchema, UserSchema,
};
use crate::inbound::http::users::{CreatedUser, UserInput};
use crate::middleware::api_key::API_KEY_HEADER;

/// Name of the security scheme guarding the users routes.
pub const API_KEY_SCHEME: &str = "ApiKeyAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            API_KEY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                API_KEY_HEADER,
                "Shared secret configured through USERS_API_KEY.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Users backend API",
        description = "CRUD over users with soft delete and audited creation."
    ),
    security(("ApiKeyAuth" = [])),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::create_user_with_audit,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::health,
    ),
    components(schemas(
        UserSchema,
        PaginatedUsersSchema,
        ErrorSchema,
        ErrorCodeSchema,
        UserInput,
        CreatedUser
    )),
    tags(
        (name = "users", description = "User CRUD"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::to_value(ApiDoc::openapi()).expect("document serialises")
    }

    #[rstest]
    #[case::list("/users", "get")]
    #[case::create("/users", "post")]
    #[case::audited_create("/users/audit", "post")]
    #[case::fetch("/users/{id}", "get")]
    #[case::update("/users/{id}", "put")]
    #[case::delete("/users/{id}", "delete")]
    #[case::health("/health", "get")]
    fn every_route_is_documented(#[case] path: &str, #[case] method: &str) {
        let doc = document();

        assert!(
            doc["paths"][path][method].is_object(),
            "{method} {path} missing"
        );
    }

    #[rstest]
    fn api_key_scheme_reads_the_header() {
        let doc = document();
        let scheme = &doc["components"]["securitySchemes"][API_KEY_SCHEME];

        assert_eq!(scheme["type"], "apiKey");
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], "X-API-KEY");
        assert_eq!(doc["security"][0][API_KEY_SCHEME], Value::Array(vec![]));
    }

    #[rstest]
    fn health_opts_out_of_the_key() {
        let doc = document();
        let security = &doc["paths"]["/health"]["get"]["security"];

        assert!(security.is_array(), "health must override the global scheme");
        assert!(!security.to_string().contains(API_KEY_SCHEME));
    }

    #[rstest]
    fn request_and_domain_schemas_are_registered() {
        let doc = document();
        let schemas = &doc["components"]["schemas"];

        for name in [
            "crate.domain.User",
            "crate.domain.PaginatedUsers",
            "crate.domain.Error",
            "crate.domain.ErrorCode",
            "UserInput",
            "CreatedUser",
        ] {
            assert!(schemas[name].is_object(), "schema {name} missing");
        }
        assert_eq!(
            schemas["UserInput"]["properties"]["email"]["example"],
            "ada@example.com"
        );
    }
}
