//! Operation types flowing through the service pipeline.
//!
//! Each HTTP endpoint maps to exactly one [`Operation`] variant. Handlers
//! build the operation, the pipeline executes it, and the handler turns the
//! [`OperationResponse`] or [`OperationError`] back into HTTP.

use std::collections::HashMap;

use rpn_core::{Operator, RpnError, StackId, Value};

/// Operation names, used for routing logs and metric labels.
pub mod operation_names {
    pub const LIST_OPERATORS: &str = "list_operators";
    pub const APPLY_OPERATOR: &str = "apply_operator";
    pub const CREATE_STACK: &str = "create_stack";
    pub const LIST_STACKS: &str = "list_stacks";
    pub const GET_STACK: &str = "get_stack";
    pub const PUSH_VALUE: &str = "push_value";
    pub const DELETE_STACK: &str = "delete_stack";
}

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Process-unique, monotonically increasing call id.
    pub call_id: u64,
    /// One of [`operation_names`].
    pub name: &'static str,
    /// Deadline enforced by the timeout middleware.
    pub call_timeout_ms: u64,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, name: &'static str, call_timeout_ms: u64) -> Self {
        Self {
            call_id,
            name,
            call_timeout_ms,
        }
    }
}

/// A single request against the calculator.
///
/// Stack ids are carried as raw strings so that a malformed id is reported
/// as a missing stack rather than a transport error.
#[derive(Debug)]
pub enum Operation {
    ListOperators {
        ctx: OperationContext,
    },
    ApplyOperator {
        ctx: OperationContext,
        token: String,
        stack_id: String,
    },
    CreateStack {
        ctx: OperationContext,
        pile: Vec<Value>,
    },
    ListStacks {
        ctx: OperationContext,
    },
    GetStack {
        ctx: OperationContext,
        stack_id: String,
    },
    PushValue {
        ctx: OperationContext,
        stack_id: String,
        value: Value,
    },
    DeleteStack {
        ctx: OperationContext,
        stack_id: String,
    },
}

impl Operation {
    /// Returns the context of any variant.
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Self::ListOperators { ctx }
            | Self::ApplyOperator { ctx, .. }
            | Self::CreateStack { ctx, .. }
            | Self::ListStacks { ctx }
            | Self::GetStack { ctx, .. }
            | Self::PushValue { ctx, .. }
            | Self::DeleteStack { ctx, .. } => ctx,
        }
    }
}

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResponse {
    /// The supported operators.
    Operators(Vec<Operator>),
    /// Contents of one stack.
    Stack(Vec<Value>),
    /// A stack was created.
    Created { id: StackId, stack: Vec<Value> },
    /// Every stack.
    Stacks(HashMap<StackId, Vec<Value>>),
    /// A value was appended.
    Pushed { id: StackId, value: Value },
    /// A stack was removed.
    Deleted,
}

/// Errors returned by the operation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Rpn(#[from] RpnError),
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("server overloaded, try again later")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
