//! Operator engine: pure validation and computation of one operator
//! application against a stack's current contents.
//!
//! The engine never touches storage. It takes the contents by reference,
//! works on a copy, and hands back the new contents for the caller to commit.
//! On any error the input is left exactly as it was.

use tracing::trace;

use crate::error::RpnError;
use crate::operator::Operator;
use crate::types::{Number, Value};

/// Applies `op` to the top two values of `contents`.
///
/// The last element is the right operand and the one below it the left
/// operand, so pushing `10`, `4` and applying `-` yields `6`. Returns the
/// contents with both operands replaced by the single result.
///
/// # Errors
///
/// - [`RpnError::InsufficientOperands`] if fewer than two values are present
/// - [`RpnError::NonNumericOperand`] if either operand is not a number
/// - [`RpnError::DivisionByZero`] for `/` with a zero right operand
/// - [`RpnError::ArithmeticOverflow`] if the result is not a finite number
pub fn apply(op: Operator, contents: &[Value]) -> Result<Vec<Value>, RpnError> {
    let depth = contents.len();
    if depth < 2 {
        return Err(RpnError::InsufficientOperands { op, depth });
    }

    let mut next = contents.to_vec();
    let (Some(right), Some(left)) = (next.pop(), next.pop()) else {
        return Err(RpnError::InsufficientOperands { op, depth });
    };

    let (Some(left), Some(right)) = (left.as_number(), right.as_number()) else {
        return Err(RpnError::NonNumericOperand { op });
    };

    if op == Operator::Divide && right.is_zero() {
        return Err(RpnError::DivisionByZero);
    }

    let result = compute(op, left, right)?;
    trace!(%op, %left, %right, %result, "operator applied");

    next.push(Value::Number(result));
    Ok(next)
}

#[allow(clippy::cast_precision_loss)]
fn compute(op: Operator, left: Number, right: Number) -> Result<Number, RpnError> {
    let result = match (left, right) {
        (Number::Int(l), Number::Int(r)) => op
            .checked_int(l, r)
            .map_or_else(|| Number::Float(op.float(l as f64, r as f64)), Number::Int),
        (l, r) => Number::Float(op.float(l.as_f64(), r.as_f64())),
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(RpnError::ArithmeticOverflow { op })
    }
}
