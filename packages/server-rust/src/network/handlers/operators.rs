//! Operator endpoints: `GET /rpn/op` and `POST /rpn/op/{op}/stack/{stack_id}`.

use axum::extract::{OriginalUri, Path, State};
use axum::Json;
use rpn_core::Operator;

use super::stacks::StackContents;
use super::{unexpected, ApiError, AppState, MessageBody};
use crate::service::{operation_names, Operation, OperationResponse};

/// Lists the supported operator tokens.
///
/// # Errors
///
/// Only pipeline failures (overload, timeout).
#[utoipa::path(
    get,
    path = "/rpn/op",
    responses((status = 200, description = "Operator tokens", body = Vec<String>)),
    tag = "operators"
)]
pub async fn list_operators_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Operator>>, ApiError> {
    let op = Operation::ListOperators {
        ctx: state.dispatcher.context(operation_names::LIST_OPERATORS),
    };
    match state.run(op).await? {
        OperationResponse::Operators(ops) => Ok(Json(ops)),
        other => Err(unexpected(&other)),
    }
}

/// Applies an operator to a stack and returns the new contents.
///
/// Mounted on `/rpn/op/{*tail}` so the operator segment may itself be `/`
/// (`/rpn/op///stack/{id}` or `/rpn/op/%2F/stack/{id}`). The tail is split
/// on its last `/stack/`.
///
/// # Errors
///
/// 404 for a missing stack or a tail without `/stack/`; 422 for an unknown
/// operator or operands the operator cannot take; 409 for a stale commit in
/// versioned mode.
#[utoipa::path(
    post,
    path = "/rpn/op/{op}/stack/{stack_id}",
    params(
        ("op" = String, Path, description = "Operator token; `/` may be sent literally or as `%2F`"),
        ("stack_id" = String, Path, description = "Stack id (UUID)"),
    ),
    responses(
        (status = 200, description = "Contents after the operator", body = StackContents),
        (status = 404, description = "No such stack", body = MessageBody),
        (status = 409, description = "Stack changed during a versioned commit", body = MessageBody),
        (status = 422, description = "Unknown operator or unusable operands", body = MessageBody),
    ),
    tag = "operators"
)]
pub async fn apply_operator_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(tail): Path<String>,
) -> Result<Json<StackContents>, ApiError> {
    let Some((token, stack_id)) = split_apply_path(&tail) else {
        return Err(ApiError::no_route(uri.path()));
    };

    let op = Operation::ApplyOperator {
        ctx: state.dispatcher.context(operation_names::APPLY_OPERATOR),
        token: token.to_string(),
        stack_id: stack_id.to_string(),
    };
    match state.run(op).await? {
        OperationResponse::Stack(contents) => Ok(Json(StackContents(contents))),
        other => Err(unexpected(&other)),
    }
}

/// Splits `"{op}/stack/{id}"` into its operator token and stack id.
fn split_apply_path(tail: &str) -> Option<(&str, &str)> {
    tail.rsplit_once("/stack/")
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rpn_core::Value;
    use serde_json::json;

    use std::sync::Arc;

    use super::*;
    use crate::network::handlers::test_support::{send, test_router, test_state_over};
    use crate::network::module::build_router;
    use crate::service::{CommitMode, ServerConfig};
    use crate::storage::test_support::InterleavingStore;
    use crate::storage::{StackRegistry, StackStore};

    #[test]
    fn split_apply_path_handles_slash_operator() {
        assert_eq!(split_apply_path("+/stack/abc"), Some(("+", "abc")));
        assert_eq!(split_apply_path("//stack/abc"), Some(("/", "abc")));
        assert_eq!(split_apply_path("+/stack/a/stack/b"), Some(("+/stack/a", "b")));
        assert_eq!(split_apply_path("+/stack/"), Some(("+", "")));
        assert_eq!(split_apply_path("+"), None);
    }

    #[tokio::test]
    async fn lists_operator_tokens() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "GET", "/rpn/op", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["+", "-", "*", "/"]));
    }

    #[tokio::test]
    async fn applies_operator_and_returns_contents() {
        let (router, state) = test_router();
        let (id, _) = state.registry.create(vec![Value::from(1), Value::from(2)]);

        let (status, body) = send(&router, "POST", &format!("/rpn/op/+/stack/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([3]));
        assert_eq!(state.registry.get(&id).unwrap(), vec![Value::from(3)]);
    }

    #[tokio::test]
    async fn divide_accepts_literal_and_encoded_slash() {
        let (router, state) = test_router();
        let (id, _) = state
            .registry
            .create(vec![Value::from(100), Value::from(5), Value::from(2)]);

        let (status, body) = send(&router, "POST", &format!("/rpn/op/%2F/stack/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([100, 2.5]));

        let (status, body) = send(&router, "POST", &format!("/rpn/op///stack/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([40.0]));
    }

    #[tokio::test]
    async fn unknown_operator_is_unprocessable() {
        let (router, state) = test_router();
        let (id, _) = state.registry.create(vec![Value::from(1), Value::from(2)]);

        let (status, body) = send(&router, "POST", &format!("/rpn/op/%25/stack/{id}"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "operator % not supported");
    }

    #[tokio::test]
    async fn missing_stack_is_not_found() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "POST", "/rpn/op/+/stack/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "stack unknown not found");
    }

    #[tokio::test]
    async fn domain_errors_are_unprocessable_and_leave_stack() {
        let (router, state) = test_router();
        let cases = [
            ("*", vec![Value::from("a"), Value::from(2)]),
            ("/", vec![Value::from(10), Value::from(0)]),
            ("-", vec![Value::from(1)]),
        ];
        for (token, pile) in cases {
            let (id, _) = state.registry.create(pile.clone());
            let uri = format!("/rpn/op/{}/stack/{id}", token.replace('/', "%2F"));
            let (status, body) = send(&router, "POST", &uri, None).await;

            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "token {token}");
            assert!(body["message"].is_string());
            assert_eq!(state.registry.get(&id).unwrap(), pile);
        }
    }

    #[tokio::test]
    async fn tail_without_stack_segment_is_not_found() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "POST", "/rpn/op/+", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "no route for /rpn/op/+");
    }

    #[tokio::test]
    async fn stale_versioned_commit_is_conflict() {
        let store = Arc::new(InterleavingStore::default());
        let shared: Arc<dyn StackStore> = store.clone();
        let config = ServerConfig {
            commit_mode: CommitMode::Versioned,
            ..ServerConfig::default()
        };
        let state = test_state_over(Arc::new(StackRegistry::with_store(shared)), &config);
        let router = build_router(state.clone());
        let (id, _) = state.registry.create(vec![Value::from(1), Value::from(2)]);

        store.queue_push(Value::from(5));
        let (status, body) = send(&router, "POST", &format!("/rpn/op/+/stack/{id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["message"],
            format!("stack {id} was modified concurrently, retry the operation")
        );
        assert_eq!(
            state.registry.get(&id).unwrap(),
            vec![Value::from(1), Value::from(2), Value::from(5)]
        );
    }
}
