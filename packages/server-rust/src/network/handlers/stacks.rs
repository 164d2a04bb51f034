//! Stack endpoints under `/rpn/stack`.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rpn_core::{StackId, Value};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{unexpected, ApiError, AppState, JsonBody, MessageBody};
use crate::service::{operation_names, Operation, OperationResponse};

/// Body of `POST /rpn/stack`. A missing `pile` creates an empty stack.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStackRequest {
    /// Initial contents, bottom first.
    #[serde(default)]
    #[schema(value_type = Vec<Value>)]
    pub pile: Vec<Value>,
}

/// Body of a `201 Created` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedStack {
    #[schema(value_type = String)]
    pub id: StackId,
    #[schema(value_type = Vec<Value>)]
    pub stack: Vec<Value>,
}

/// A stack's contents, bottom first.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Vec<Value>)]
pub struct StackContents(pub Vec<Value>);

/// Every stack keyed by id.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct StackListing(pub BTreeMap<String, Vec<Value>>);

/// One value to push. Any JSON is accepted.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Value)]
pub struct StackEntry(pub Value);

/// Creates a stack seeded with `pile`.
///
/// # Errors
///
/// Malformed bodies, and pipeline failures (overload, timeout).
#[utoipa::path(
    post,
    path = "/rpn/stack",
    request_body = CreateStackRequest,
    responses(
        (status = 201, description = "Stack created", body = CreatedStack),
        (status = 400, description = "Body is not JSON", body = MessageBody),
        (status = 422, description = "Body does not match the schema", body = MessageBody),
    ),
    tag = "stacks"
)]
pub async fn create_stack_handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateStackRequest>,
) -> Result<(StatusCode, Json<CreatedStack>), ApiError> {
    let op = Operation::CreateStack {
        ctx: state.dispatcher.context(operation_names::CREATE_STACK),
        pile: request.pile,
    };
    match state.run(op).await? {
        OperationResponse::Created { id, stack } => {
            Ok((StatusCode::CREATED, Json(CreatedStack { id, stack })))
        }
        other => Err(unexpected(&other)),
    }
}

/// Lists every stack as `{ "<id>": [...] }`, keys sorted.
///
/// # Errors
///
/// Only pipeline failures (overload, timeout).
#[utoipa::path(
    get,
    path = "/rpn/stack",
    responses((status = 200, description = "Every stack keyed by id", body = StackListing)),
    tag = "stacks"
)]
pub async fn list_stacks_handler(
    State(state): State<AppState>,
) -> Result<Json<StackListing>, ApiError> {
    let op = Operation::ListStacks {
        ctx: state.dispatcher.context(operation_names::LIST_STACKS),
    };
    match state.run(op).await? {
        OperationResponse::Stacks(all) => Ok(Json(StackListing(
            all.into_iter()
                .map(|(id, contents)| (id.to_string(), contents))
                .collect(),
        ))),
        other => Err(unexpected(&other)),
    }
}

/// Returns one stack's contents.
///
/// # Errors
///
/// 404 if the stack does not exist.
#[utoipa::path(
    get,
    path = "/rpn/stack/{stack_id}",
    params(("stack_id" = String, Path, description = "Stack id (UUID)")),
    responses(
        (status = 200, description = "Stack contents", body = StackContents),
        (status = 404, description = "No such stack", body = MessageBody),
    ),
    tag = "stacks"
)]
pub async fn get_stack_handler(
    State(state): State<AppState>,
    Path(stack_id): Path<String>,
) -> Result<Json<StackContents>, ApiError> {
    let op = Operation::GetStack {
        ctx: state.dispatcher.context(operation_names::GET_STACK),
        stack_id,
    };
    match state.run(op).await? {
        OperationResponse::Stack(contents) => Ok(Json(StackContents(contents))),
        other => Err(unexpected(&other)),
    }
}

/// Pushes any JSON value onto a stack. Values are not validated here;
/// numeric checks happen when an operator is applied.
///
/// # Errors
///
/// 404 if the stack does not exist; 4xx for a body that is not JSON.
#[utoipa::path(
    post,
    path = "/rpn/stack/{stack_id}",
    params(("stack_id" = String, Path, description = "Stack id (UUID)")),
    request_body = StackEntry,
    responses(
        (status = 200, description = "Value pushed", body = MessageBody),
        (status = 404, description = "No such stack", body = MessageBody),
        (status = 415, description = "Body is not `application/json`", body = MessageBody),
    ),
    tag = "stacks"
)]
pub async fn push_value_handler(
    State(state): State<AppState>,
    Path(stack_id): Path<String>,
    JsonBody(StackEntry(value)): JsonBody<StackEntry>,
) -> Result<Json<MessageBody>, ApiError> {
    let op = Operation::PushValue {
        ctx: state.dispatcher.context(operation_names::PUSH_VALUE),
        stack_id,
        value,
    };
    match state.run(op).await? {
        OperationResponse::Pushed { id, value } => Ok(Json(MessageBody::new(format!(
            "Value {value} added to stack {id}"
        )))),
        other => Err(unexpected(&other)),
    }
}

/// Deletes a stack.
///
/// # Errors
///
/// 404 if the stack does not exist.
#[utoipa::path(
    delete,
    path = "/rpn/stack/{stack_id}",
    params(("stack_id" = String, Path, description = "Stack id (UUID)")),
    responses(
        (status = 204, description = "Stack deleted"),
        (status = 404, description = "No such stack", body = MessageBody),
    ),
    tag = "stacks"
)]
pub async fn delete_stack_handler(
    State(state): State<AppState>,
    Path(stack_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let op = Operation::DeleteStack {
        ctx: state.dispatcher.context(operation_names::DELETE_STACK),
        stack_id,
    };
    match state.run(op).await? {
        OperationResponse::Deleted => Ok(StatusCode::NO_CONTENT),
        other => Err(unexpected(&other)),
    }
}
