//! Token system for canonical branching logic
//!
//! The grammar is deliberately tiny: field references, six comparison
//! operators, integer literals, two joiners, and parentheses. Everything is a
//! dedicated token so the parser never has to re-inspect raw text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators permitted between a field reference and an integer
/// literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    Equal,              // ==
    NotEqual,           // !=
    LessThanOrEqual,    // <=
    LessThan,           // <
}

impl CompareOp {
    /// Apply the operator to already-cast operands
    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::GreaterThan => lhs > rhs,
            Self::GreaterThanOrEqual => lhs >= rhs,
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::LessThanOrEqual => lhs <= rhs,
            Self::LessThan => lhs < rhs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThanOrEqual => "<=",
            Self::LessThan => "<",
        }
    }

    /// Map an operator symbol to its token
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::GreaterThan),
            ">=" => Some(Self::GreaterThanOrEqual),
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<=" => Some(Self::LessThanOrEqual),
            "<" => Some(Self::LessThan),
            _ => None,
        }
    }
}

/// Tokens of the canonical branching-logic grammar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicToken {
    /// Field reference: alphanumeric plus underscore
    FieldRef(String),
    /// Comparison operator between a field reference and a literal
    Compare(CompareOp),
    /// Integer literal (optional leading minus, digits only)
    IntLiteral(i64),
    /// Chain joiner `and`
    And,
    /// Chain joiner `or`
    Or,
    /// Opening parenthesis of a sub-chain
    OpenParen,
    /// Closing parenthesis of a sub-chain
    CloseParen,
}

impl LogicToken {
    /// Check if this token joins two chain links
    pub fn is_joiner(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Check if this token is a comparison operator
    pub fn is_comparison_operator(&self) -> bool {
        matches!(self, Self::Compare(_))
    }

    /// Check if this token is a field reference
    pub fn is_field_ref(&self) -> bool {
        matches!(self, Self::FieldRef(_))
    }

    /// Get field name if this token is a field reference
    pub fn as_field_ref(&self) -> Option<&str> {
        match self {
            Self::FieldRef(name) => Some(name),
            _ => None,
        }
    }

    /// Get the token as it appears in canonical logic text
    pub fn as_logic_string(&self) -> String {
        match self {
            Self::FieldRef(name) => name.clone(),
            Self::Compare(op) => op.as_str().to_string(),
            Self::IntLiteral(n) => n.to_string(),
            Self::And => "and".to_string(),
            Self::Or => "or".to_string(),
            Self::OpenParen => "(".to_string(),
            Self::CloseParen => ")".to_string(),
        }
    }
}

impl fmt::Display for LogicToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_logic_string())
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a bare word as joiner or field reference
pub fn classify_word(word: &str) -> LogicToken {
    match word {
        "and" => LogicToken::And,
        "or" => LogicToken::Or,
        _ => LogicToken::FieldRef(word.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_application() {
        assert!(CompareOp::GreaterThan.apply(10, 5));
        assert!(!CompareOp::GreaterThan.apply(5, 5));
        assert!(CompareOp::GreaterThanOrEqual.apply(5, 5));
        assert!(CompareOp::Equal.apply(-555, -555));
        assert!(CompareOp::NotEqual.apply(0, 1));
        assert!(CompareOp::LessThanOrEqual.apply(-1, 0));
        assert!(CompareOp::LessThan.apply(-10, -9));
    }

    #[test]
    fn test_symbol_round_trip() {
        for op in [
            CompareOp::GreaterThan,
            CompareOp::GreaterThanOrEqual,
            CompareOp::Equal,
            CompareOp::NotEqual,
            CompareOp::LessThanOrEqual,
            CompareOp::LessThan,
        ] {
            assert_eq!(CompareOp::from_symbol(op.as_str()), Some(op));
        }
        // Bare = never survives translation, so it is not an operator here
        assert_eq!(CompareOp::from_symbol("="), None);
    }

    #[test]
    fn test_word_classification() {
        assert_eq!(classify_word("and"), LogicToken::And);
        assert_eq!(classify_word("or"), LogicToken::Or);
        assert_eq!(
            classify_word("ubacc_score_t1"),
            LogicToken::FieldRef("ubacc_score_t1".to_string())
        );
    }
}
