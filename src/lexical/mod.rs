//! Lexical analysis of canonical branching logic
//!
//! Turns one canonical logic string into a flat token sequence. Errors here
//! are not surfaced to callers of `syntax::parse`; a string that cannot be
//! tokenized degrades to "always eligible" there, because most blanks in the
//! platform simply carry no logic at all.

use crate::config::constants::compile_time::lexical::{
    MAX_EXPRESSION_LENGTH, MAX_FIELD_REF_LENGTH, MAX_TOKEN_COUNT,
};
use crate::diagnostics::codes;
use crate::tokens::{classify_word, CompareOp, LogicToken};

/// Tokenization errors with compile-time input boundaries
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at offset {offset}")]
    InvalidCharacter { character: char, offset: usize },

    #[error("Invalid integer literal: '{text}'")]
    InvalidNumber { text: String },

    #[error("Expression too long: {length} characters (max {MAX_EXPRESSION_LENGTH})")]
    ExpressionTooLong { length: usize },

    #[error("Field reference too long: {length} characters (max {MAX_FIELD_REF_LENGTH})")]
    FieldRefTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::diagnostics::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::ExpressionTooLong { .. } => codes::lexical::EXPRESSION_TOO_LONG,
            LexerError::FieldRefTooLong { .. } => codes::lexical::FIELD_REF_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Tokenize one canonical logic string.
///
/// Whitespace separates tokens but is otherwise ignored; the platform writes
/// `a>5` and `a > 5` interchangeably.
pub fn tokenize(canonical: &str) -> Result<Vec<LogicToken>, LexerError> {
    if canonical.len() > MAX_EXPRESSION_LENGTH {
        return Err(LexerError::ExpressionTooLong {
            length: canonical.len(),
        });
    }

    let chars: Vec<char> = canonical.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexerError::TooManyTokens {
                count: tokens.len(),
            });
        }

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '(' => {
                tokens.push(LogicToken::OpenParen);
                i += 1;
            }
            ')' => {
                tokens.push(LogicToken::CloseParen);
                i += 1;
            }
            '<' | '>' | '!' | '=' => {
                let pair: String = if chars.get(i + 1) == Some(&'=') {
                    chars[i..i + 2].iter().collect()
                } else {
                    c.to_string()
                };
                match CompareOp::from_symbol(&pair) {
                    Some(op) => {
                        tokens.push(LogicToken::Compare(op));
                        i += pair.len();
                    }
                    // A stray = or ! means the translator never saw this
                    // string; let the grammar degrade it
                    None => {
                        return Err(LexerError::InvalidCharacter {
                            character: c,
                            offset: i,
                        })
                    }
                }
            }
            '-' => {
                let (literal, next) = scan_integer(&chars, i)?;
                tokens.push(LogicToken::IntLiteral(literal));
                i = next;
            }
            _ if c.is_ascii_digit() => {
                let (literal, next) = scan_integer(&chars, i)?;
                tokens.push(LogicToken::IntLiteral(literal));
                i = next;
            }
            _ if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                if i - start > MAX_FIELD_REF_LENGTH {
                    return Err(LexerError::FieldRefTooLong { length: i - start });
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(classify_word(&word));
            }
            _ => {
                return Err(LexerError::InvalidCharacter {
                    character: c,
                    offset: i,
                })
            }
        }
    }

    Ok(tokens)
}

/// Scan an integer literal: optional leading minus, then digits. The source
/// domain never uses fractional literals, so a `.` after the digits is left
/// in place to fail as an invalid character.
fn scan_integer(chars: &[char], pos: usize) -> Result<(i64, usize), LexerError> {
    let mut i = pos;
    if chars.get(i) == Some(&'-') {
        i += 1;
    }
    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }

    let text: String = chars[pos..i].iter().collect();
    if i == digits_start {
        return Err(LexerError::InvalidNumber { text });
    }
    let value = text
        .parse::<i64>()
        .map_err(|_| LexerError::InvalidNumber { text })?;
    Ok((value, i))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_tokenize_simple_comparison() {
        let tokens = tokenize("age >= 18").unwrap();
        assert_eq!(
            tokens,
            vec![
                LogicToken::FieldRef("age".to_string()),
                LogicToken::Compare(CompareOp::GreaterThanOrEqual),
                LogicToken::IntLiteral(18),
            ]
        );
    }

    #[test]
    fn test_tokenize_without_spaces() {
        let tokens = tokenize("q1==1").unwrap();
        assert_eq!(
            tokens,
            vec![
                LogicToken::FieldRef("q1".to_string()),
                LogicToken::Compare(CompareOp::Equal),
                LogicToken::IntLiteral(1),
            ]
        );
    }

    #[test]
    fn test_tokenize_negative_literal() {
        let tokens = tokenize("Var8 == -10").unwrap();
        assert_eq!(tokens[2], LogicToken::IntLiteral(-10));
    }

    #[test]
    fn test_tokenize_chain_with_parentheses() {
        let tokens = tokenize("(a == 1 or b == 2) and c < 0").unwrap();
        assert_eq!(tokens[0], LogicToken::OpenParen);
        assert_eq!(tokens[4], LogicToken::Or);
        assert_eq!(tokens[8], LogicToken::CloseParen);
        assert_eq!(tokens[9], LogicToken::And);
    }

    #[test]
    fn test_checkbox_subfield_reference() {
        let tokens = tokenize("assist_other_specify_list___1 == 1").unwrap();
        assert_eq!(
            tokens[0],
            LogicToken::FieldRef("assist_other_specify_list___1".to_string())
        );
    }

    #[test]
    fn test_bare_equals_is_rejected() {
        assert_matches!(
            tokenize("q1 = 1"),
            Err(LexerError::InvalidCharacter { character: '=', .. })
        );
    }

    #[test]
    fn test_lone_minus_is_invalid_number() {
        assert_matches!(tokenize("a == -"), Err(LexerError::InvalidNumber { .. }));
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        assert_matches!(
            tokenize("a == 1 # comment"),
            Err(LexerError::InvalidCharacter { character: '#', .. })
        );
    }

    #[test]
    fn test_error_codes_are_registered() {
        let err = tokenize("a == 1.5").unwrap_err();
        assert_ne!(
            crate::diagnostics::codes::get_description(err.error_code().as_str()),
            "Unknown code"
        );
    }
}
