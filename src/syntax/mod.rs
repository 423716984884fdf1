//! Recursive grammar for canonical branching logic
//!
//! The accepted language is deliberately closed and auditable:
//!
//! ```text
//! comparison      := fieldRef operator intLiteral
//! chain           := [ '(' ] comparison [ ')' ] [ ('and'|'or') chainParen ]
//! chainParen      := chain | '(' chain ')'
//! expression      := chain end-of-input
//! ```
//!
//! Parsing validates shape and yields the ordered token sequence as-is; no
//! precedence tree is built, because evaluation is defined strictly left to
//! right with no and/or distinction, matching the platform's own chain
//! semantics.
//!
//! Failure policy: an empty string is "always eligible" and produces no
//! diagnostic. A non-empty string that fails to tokenize or parse also
//! degrades to "always eligible," but raises a diagnostic, since logic that
//! exists and cannot be read may cause blanks to be flagged incorrectly.

use crate::config::constants::compile_time::syntax::MAX_NESTING_DEPTH;
use crate::diagnostics::codes;
use crate::lexical::{tokenize, LexerError};
use crate::log_warning;
use crate::tokens::LogicToken;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Grammar validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found '{found}' at position {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: &'static str },

    #[error("Trailing input after complete chain at position {position}")]
    TrailingInput { position: usize },

    #[error("Parenthesis nesting exceeds depth {MAX_NESTING_DEPTH}")]
    MaxNestingDepth,

    #[error(transparent)]
    Lexer(#[from] LexerError),
}

impl SyntaxError {
    pub fn error_code(&self) -> crate::diagnostics::Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::TrailingInput { .. } => codes::syntax::TRAILING_INPUT,
            Self::MaxNestingDepth => codes::syntax::MAX_NESTING_DEPTH,
            Self::Lexer(err) => err.error_code(),
        }
    }
}

/// Result of parsing one canonical logic string.
///
/// `Always` covers both "the field has no logic" and "the logic could not be
/// read"; the two share the same downstream treatment.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLogic {
    /// Field is always eligible to be answered
    Always,
    /// Validated token sequence, reduced left to right at evaluation time
    Expression(Vec<LogicToken>),
}

impl ParsedLogic {
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

/// Parse one canonical logic string into an ordered token sequence.
///
/// Never returns an error: unparseable non-empty input degrades to
/// [`ParsedLogic::Always`] with a MalformedExpression diagnostic.
pub fn parse(canonical: &str) -> ParsedLogic {
    if canonical.trim().is_empty() {
        return ParsedLogic::Always;
    }

    match try_parse(canonical) {
        Ok(tokens) => ParsedLogic::Expression(tokens),
        Err(err) => {
            log_warning!(codes::syntax::MALFORMED_EXPRESSION,
                "Branching logic failed to parse; treating field as always eligible",
                "logic" => canonical,
                "cause" => err,
                "code" => err.error_code()
            );
            ParsedLogic::Always
        }
    }
}

/// Strict variant of [`parse`] for callers that want the failure itself
pub fn try_parse(canonical: &str) -> SyntaxResult<Vec<LogicToken>> {
    let tokens = tokenize(canonical)?;
    let mut validator = ChainValidator::new(&tokens);
    validator.validate_expression()?;
    Ok(tokens)
}

/// Walk over the token sequence validating the chain grammar without
/// building a tree.
///
/// The right recursion `chain := ... [ joiner chainParen ]` is unrolled into
/// a loop so nesting depth is bounded by a counter instead of the call
/// stack. Parentheses are optional on both sides of a comparison, exactly as
/// the grammar states, so a lone unmatched parenthesis does not reject the
/// expression; the evaluator tolerates the same shapes.
struct ChainValidator<'a> {
    tokens: &'a [LogicToken],
    position: usize,
}

impl<'a> ChainValidator<'a> {
    fn new(tokens: &'a [LogicToken]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn current(&self) -> Option<&LogicToken> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn eat(&mut self, token: &LogicToken) -> bool {
        if self.current() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// expression := chain end-of-input
    fn validate_expression(&mut self) -> SyntaxResult<()> {
        self.validate_chain()?;
        match self.current() {
            None => Ok(()),
            Some(_) => Err(SyntaxError::TrailingInput {
                position: self.position,
            }),
        }
    }

    /// chain := [ '(' ] comparison [ ')' ] [ joiner chainParen ]
    /// chainParen := chain | '(' chain ')'
    fn validate_chain(&mut self) -> SyntaxResult<()> {
        // Current depth, not total opens; a long flat run of depth-1 groups
        // must stay well under the bound
        let mut depth = 0usize;

        loop {
            // Leading parentheses: one from the chain production itself plus
            // any contributed by nested chainParen alternatives
            while self.eat(&LogicToken::OpenParen) {
                depth += 1;
                if depth >= MAX_NESTING_DEPTH {
                    return Err(SyntaxError::MaxNestingDepth);
                }
            }

            self.validate_comparison()?;

            // Trailing parentheses close this comparison's optional group
            // and any enclosing sub-chains
            while self.eat(&LogicToken::CloseParen) {
                depth = depth.saturating_sub(1);
            }

            if matches!(self.current(), Some(t) if t.is_joiner()) {
                self.advance();
                continue;
            }
            return Ok(());
        }
    }

    /// comparison := fieldRef operator intLiteral
    fn validate_comparison(&mut self) -> SyntaxResult<()> {
        self.expect("field reference", |t| t.is_field_ref())?;
        self.expect("comparison operator", |t| t.is_comparison_operator())?;
        self.expect("integer literal", |t| {
            matches!(t, LogicToken::IntLiteral(_))
        })?;
        Ok(())
    }

    fn expect(
        &mut self,
        expected: &'static str,
        pred: impl Fn(&LogicToken) -> bool,
    ) -> SyntaxResult<()> {
        match self.current() {
            Some(token) if pred(token) => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(SyntaxError::UnexpectedToken {
                expected,
                found: token.to_string(),
                position: self.position,
            }),
            None => Err(SyntaxError::UnexpectedEndOfInput { expected }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_input_is_always_eligible() {
        assert_eq!(parse(""), ParsedLogic::Always);
        assert_eq!(parse("   "), ParsedLogic::Always);
    }

    #[test]
    fn test_single_comparison() {
        assert_matches!(parse("a > 5"), ParsedLogic::Expression(tokens) if tokens.len() == 3);
    }

    #[test]
    fn test_joined_chain() {
        assert_matches!(
            parse("a > 5 and b == 1 or c != 0"),
            ParsedLogic::Expression(tokens) if tokens.len() == 11
        );
    }

    #[test]
    fn test_parenthesized_sub_chain() {
        assert_matches!(
            parse("current_country == 2 and (lang_number >= 2)"),
            ParsedLogic::Expression(_)
        );
    }

    #[test]
    fn test_nested_parentheses() {
        assert_matches!(
            parse("a == 1 and ((b == 2 or c == 3) and d == 4)"),
            ParsedLogic::Expression(_)
        );
    }

    #[test]
    fn test_leading_parenthesized_group() {
        assert_matches!(
            parse("(birth_country == 2) and (ethnicity_number == 1 or ethnicity_number == 2)"),
            ParsedLogic::Expression(_)
        );
    }

    #[test]
    fn test_malformed_input_degrades_to_always() {
        // All of these exist but cannot be read; they evaluate true
        assert_eq!(parse("a >"), ParsedLogic::Always);
        assert_eq!(parse("and a == 1"), ParsedLogic::Always);
        assert_eq!(parse("a == b"), ParsedLogic::Always);
        assert_eq!(parse("a == 1 b == 2"), ParsedLogic::Always);
        assert_eq!(parse("1 == a"), ParsedLogic::Always);
    }

    #[test]
    fn test_strict_parse_reports_cause() {
        assert_matches!(
            try_parse("a >"),
            Err(SyntaxError::UnexpectedEndOfInput { .. })
        );
        assert_matches!(try_parse("a == b"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(
            try_parse("a == 1 b == 2"),
            Err(SyntaxError::TrailingInput { .. })
        );
        assert_matches!(try_parse("a = 1"), Err(SyntaxError::Lexer(_)));
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let mut deep = String::new();
        for _ in 0..200 {
            deep.push_str("a == 1 and (");
        }
        deep.push_str("b == 2");
        for _ in 0..200 {
            deep.push(')');
        }
        // Must degrade rather than overflow the stack
        assert_eq!(parse(&deep), ParsedLogic::Always);
    }

    #[test]
    fn test_long_flat_chain_of_groups_is_accepted() {
        // Each group closes before the next opens, so real nesting depth
        // stays at 1 no matter how many groups the chain carries
        let chain = vec!["(a == 1)"; 70].join(" and ");
        assert_matches!(parse(&chain), ParsedLogic::Expression(_));
    }

    #[test]
    fn test_float_literals_are_rejected() {
        assert_eq!(parse("a == 1.5"), ParsedLogic::Always);
    }
}
