//! Mapping from handler failures to HTTP responses.
//!
//! Every failure renders as [`MessageBody`]: domain and pipeline errors
//! through [`OperationError`], and request bodies axum could not extract
//! through [`JsonBody`]'s rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rpn_core::RpnError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::service::OperationError;

/// `{"message": "..."}`, the body of every error and of push
/// acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// The operation ran and failed, or the pipeline refused it.
    Operation(OperationError),
    /// The request never became an operation: bad body, content type, or
    /// path shape.
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    /// 404 for a missing stack, 409 for a stale versioned commit, 422 for
    /// every other domain error. Rejections keep their own status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Operation(OperationError::Rpn(RpnError::StackNotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            Self::Operation(OperationError::Rpn(RpnError::ConcurrentModification { .. })) => {
                StatusCode::CONFLICT
            }
            Self::Operation(OperationError::Rpn(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Operation(OperationError::Timeout { .. }) => StatusCode::REQUEST_TIMEOUT,
            Self::Operation(OperationError::Overloaded) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Operation(OperationError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    /// Rejection for a request whose path does not name a resource.
    #[must_use]
    pub fn no_route(path: &str) -> Self {
        Self::Rejected {
            status: StatusCode::NOT_FOUND,
            message: format!("no route for {path}"),
        }
    }
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        Self::Operation(err)
    }
}

impl From<RpnError> for ApiError {
    fn from(err: RpnError) -> Self {
        Self::Operation(OperationError::Rpn(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Operation(OperationError::Internal(err)) => {
                error!(error = ?err, "internal error while handling request");
                "internal server error".to_string()
            }
            Self::Operation(other) => other.to_string(),
            Self::Rejected { message, .. } => {
                debug!(%status, %message, "request rejected");
                message
            }
        };
        (status, Json(MessageBody { message })).into_response()
    }
}

/// `Json<T>` whose rejection is an [`ApiError`], so malformed bodies get the
/// same `{"message"}` shape as every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
