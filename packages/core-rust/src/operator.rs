//! The closed set of binary arithmetic operators.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::RpnError;

/// Binary arithmetic operator applied to the top two values of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/` (real division)
    Divide,
}

impl Operator {
    /// Every supported operator, in the order they are advertised to clients.
    pub const ALL: [Operator; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// The wire token for this operator.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    /// Integer form of the operator. `None` on `i64` overflow and for
    /// division, which is always carried out in floating point.
    pub(crate) fn checked_int(self, left: i64, right: i64) -> Option<i64> {
        match self {
            Self::Add => left.checked_add(right),
            Self::Subtract => left.checked_sub(right),
            Self::Multiply => left.checked_mul(right),
            Self::Divide => None,
        }
    }

    pub(crate) fn float(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => left / right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Operator {
    type Err = RpnError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == token)
            .ok_or_else(|| RpnError::UnknownOperator {
                token: token.to_string(),
            })
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_back_to_operators() {
        for op in Operator::ALL {
            assert_eq!(op.token().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_token_is_rejected() {
        let err = "%".parse::<Operator>().unwrap_err();
        assert!(matches!(err, RpnError::UnknownOperator { ref token } if token == "%"));

        // Tokens are matched exactly.
        assert!(" +".parse::<Operator>().is_err());
        assert!("".parse::<Operator>().is_err());
        assert!("add".parse::<Operator>().is_err());
    }

    #[test]
    fn operators_serialize_as_tokens() {
        let json = serde_json::to_value(Operator::ALL).unwrap();
        assert_eq!(json, serde_json::json!(["+", "-", "*", "/"]));
    }

    #[test]
    fn division_has_no_integer_form() {
        assert_eq!(Operator::Divide.checked_int(6, 3), None);
        assert_eq!(Operator::Add.checked_int(i64::MAX, 1), None);
        assert_eq!(Operator::Multiply.checked_int(6, 7), Some(42));
    }
}
