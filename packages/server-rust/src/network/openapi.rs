//! OpenAPI description of the HTTP surface, served at `/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::{
    error::MessageBody,
    health::{self, HealthReport},
    operators,
    stacks::{self, CreateStackRequest, CreatedStack, StackContents, StackEntry, StackListing},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RPN API",
        version = "1.0",
        description = "Reverse Polish notation calculator over named stacks"
    ),
    paths(
        operators::list_operators_handler,
        operators::apply_operator_handler,
        stacks::create_stack_handler,
        stacks::list_stacks_handler,
        stacks::get_stack_handler,
        stacks::push_value_handler,
        stacks::delete_stack_handler,
        health::health_handler,
        health::liveness_handler,
        health::readiness_handler,
    ),
    components(schemas(
        CreateStackRequest,
        CreatedStack,
        StackContents,
        StackListing,
        StackEntry,
        HealthReport,
        MessageBody,
    )),
    tags(
        (name = "operators", description = "Operator listing and application"),
        (name = "stacks", description = "Stack lifecycle and contents"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;

/// `GET /openapi.json`.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
