//! Error taxonomy for stack and operator failures.
//!
//! Every variant is a client-input error: none is retried and none is fatal
//! to the process.

use crate::operator::Operator;

/// Classified failure of a stack or operator request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpnError {
    /// The operator token is not one of `+ - * /`.
    #[error("operator {token} not supported")]
    UnknownOperator { token: String },

    /// No stack exists under the given id.
    #[error("stack {id} not found")]
    StackNotFound { id: String },

    /// The stack holds fewer than two values.
    #[error("cannot apply operator {op}: stack holds {depth} value(s), two are required")]
    InsufficientOperands { op: Operator, depth: usize },

    /// At least one of the top two values is not a number.
    #[error("cannot apply operator {op} on values that are not numbers")]
    NonNumericOperand { op: Operator },

    /// Division with a zero divisor.
    #[error("cannot apply operator / on zero")]
    DivisionByZero,

    /// The result overflowed to a non-finite float.
    #[error("result of operator {op} is not a finite number")]
    ArithmeticOverflow { op: Operator },

    /// The stack changed between read and commit (versioned commits only).
    #[error("stack {id} was modified concurrently, retry the operation")]
    ConcurrentModification { id: String },
}

impl RpnError {
    /// Shorthand for [`RpnError::StackNotFound`].
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::StackNotFound { id: id.to_string() }
    }
}
