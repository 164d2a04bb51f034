//! The calculator service: executes [`Operation`]s against the shared
//! [`StackRegistry`] using the pure operator engine.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rpn_core::{engine, Operator, RpnError, StackId, Value};
use tower::Service;

use super::config::CommitMode;
use super::operation::{Operation, OperationError, OperationResponse};
use crate::storage::StackRegistry;

/// Innermost service of the operation pipeline.
///
/// Registry calls are synchronous and in-memory; the work runs when the
/// returned future is first polled.
#[derive(Clone)]
pub struct RpnService {
    registry: Arc<StackRegistry>,
    commit_mode: CommitMode,
}

impl RpnService {
    #[must_use]
    pub fn new(registry: Arc<StackRegistry>, commit_mode: CommitMode) -> Self {
        Self {
            registry,
            commit_mode,
        }
    }

    /// Executes one operation.
    ///
    /// # Errors
    ///
    /// Any [`RpnError`] raised by parsing, lookup, validation, or commit.
    pub fn execute(&self, op: Operation) -> Result<OperationResponse, RpnError> {
        match op {
            Operation::ListOperators { .. } => {
                Ok(OperationResponse::Operators(Operator::ALL.to_vec()))
            }
            Operation::ApplyOperator {
                token, stack_id, ..
            } => self
                .apply_operator(&token, &stack_id)
                .map(OperationResponse::Stack),
            Operation::CreateStack { pile, .. } => {
                let (id, stack) = self.registry.create(pile);
                Ok(OperationResponse::Created { id, stack })
            }
            Operation::ListStacks { .. } => Ok(OperationResponse::Stacks(self.registry.list())),
            Operation::GetStack { stack_id, .. } => {
                let id = parse_stack_id(&stack_id)?;
                self.registry.get(&id).map(OperationResponse::Stack)
            }
            Operation::PushValue {
                stack_id, value, ..
            } => {
                let id = parse_stack_id(&stack_id)?;
                self.registry.push(&id, value.clone())?;
                Ok(OperationResponse::Pushed { id, value })
            }
            Operation::DeleteStack { stack_id, .. } => {
                let id = parse_stack_id(&stack_id)?;
                self.registry.delete(&id)?;
                Ok(OperationResponse::Deleted)
            }
        }
    }

    /// Parses the operator, then reads, computes, and commits.
    ///
    /// The token is checked before the stack is looked up, so an unknown
    /// operator is reported even for a missing stack.
    fn apply_operator(&self, token: &str, stack_id: &str) -> Result<Vec<Value>, RpnError> {
        let op: Operator = token.parse()?;
        let id = parse_stack_id(stack_id)?;

        match self.commit_mode {
            CommitMode::Relaxed => {
                let contents = self.registry.get(&id)?;
                let next = engine::apply(op, &contents)?;
                self.registry.replace(&id, next.clone())?;
                Ok(next)
            }
            CommitMode::Versioned => {
                let (contents, version) = self.registry.get_versioned(&id)?;
                let next = engine::apply(op, &contents)?;
                self.registry.replace_if_version(&id, version, next.clone())?;
                Ok(next)
            }
        }
    }
}

/// Ids that are not valid UUIDs cannot name a stack.
fn parse_stack_id(raw: &str) -> Result<StackId, RpnError> {
    raw.parse().map_err(|_| RpnError::not_found(raw))
}

impl Service<Operation> for RpnService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let svc = self.clone();
        Box::pin(async move { svc.execute(op).map_err(OperationError::from) })
    }
}
