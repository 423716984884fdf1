//! Record-bound evaluation of parsed branching logic
//!
//! Evaluation is a pure function of one token sequence and one record; there
//! is no shared grammar or evaluator state, so distinct records can be
//! evaluated concurrently by the caller.
//!
//! The reduction is strictly left to right with no and/or precedence,
//! matching the platform's own chain semantics. Parenthesized sub-chains
//! reduce as a unit via an explicit frame stack.
//!
//! Failure asymmetry, by contract with `syntax::parse`: "no logic" has
//! already degraded to always-eligible upstream, but logic that exists and
//! fails to evaluate cleanly here (missing field, uncastable response,
//! inconsistent token run) downgrades to `false`. A field wrongly flagged as
//! a data-quality gap is recoverable; one silently marked "not applicable"
//! is not.

use crate::diagnostics::codes;
use crate::records::Record;
use crate::syntax::ParsedLogic;
use crate::tokens::{CompareOp, LogicToken};
use crate::{log_debug, log_warning};

/// Evaluate parsed logic against one record's current responses.
pub fn evaluate(logic: &ParsedLogic, record: &Record) -> bool {
    match logic {
        ParsedLogic::Always => true,
        ParsedLogic::Expression(tokens) => evaluate_tokens(tokens, record),
    }
}

/// Reduce a validated token sequence to a single boolean.
///
/// Comparisons are substituted with their record-bound truth values as they
/// are encountered; joiners combine immediately with the running value, so
/// `a or b and c` is `(a or b) and c`.
pub fn evaluate_tokens(tokens: &[LogicToken], record: &Record) -> bool {
    let mut frames: Vec<Frame> = vec![Frame::new()];
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            LogicToken::FieldRef(field) => {
                let (op, literal) = match (tokens.get(i + 1), tokens.get(i + 2)) {
                    (Some(LogicToken::Compare(op)), Some(LogicToken::IntLiteral(n))) => (*op, *n),
                    _ => {
                        log_warning!(codes::eval::MALFORMED_TOKEN_SEQUENCE,
                            "Field reference without a complete comparison",
                            "field" => field
                        );
                        return false;
                    }
                };
                let value = evaluate_comparison(field, op, literal, record);
                // A frame can only be missing if closers outnumbered openers,
                // which the validator never emits
                match frames.last_mut() {
                    Some(frame) => frame.combine(value),
                    None => return false,
                }
                i += 3;
            }
            LogicToken::And => {
                if !set_joiner(&mut frames, Joiner::And) {
                    return false;
                }
                i += 1;
            }
            LogicToken::Or => {
                if !set_joiner(&mut frames, Joiner::Or) {
                    return false;
                }
                i += 1;
            }
            LogicToken::OpenParen => {
                frames.push(Frame::new());
                i += 1;
            }
            LogicToken::CloseParen => {
                // An unmatched closer at the root is tolerated, mirroring the
                // grammar's optional parentheses
                if frames.len() > 1 {
                    let closed = frames.pop().map(Frame::result).unwrap_or(true);
                    if let Some(frame) = frames.last_mut() {
                        frame.combine(closed);
                    }
                }
                i += 1;
            }
            LogicToken::Compare(_) | LogicToken::IntLiteral(_) => {
                // Operators and literals are consumed with their field
                // reference; seeing one here means the sequence is inconsistent
                log_warning!(codes::eval::MALFORMED_TOKEN_SEQUENCE,
                    "Dangling operator or literal during reduction",
                    "token" => tokens[i]
                );
                return false;
            }
        }
    }

    // Unclosed groups fold into their parent in order, same as an implicit
    // run of closers at end of input
    while frames.len() > 1 {
        let closed = frames.pop().map(Frame::result).unwrap_or(true);
        if let Some(frame) = frames.last_mut() {
            frame.combine(closed);
        }
    }
    frames.pop().map(Frame::result).unwrap_or(true)
}

/// Evaluate one `field op literal` comparison against the record.
///
/// A field missing from the record binds to a non-matching sentinel rather
/// than aborting the whole record's evaluation; a single stale or renamed
/// field must not take down every other comparison. Casting happens only
/// here, at the moment of comparison, and a response that will not cast
/// yields `false`.
fn evaluate_comparison(field: &str, op: CompareOp, literal: i64, record: &Record) -> bool {
    let response = match record.response(field) {
        Some(response) => response,
        None => {
            log_warning!(codes::eval::UNRESOLVED_FIELD_REFERENCE,
                "Referenced field absent from record; comparison is false",
                "field" => field
            );
            return false;
        }
    };

    match response.as_int() {
        Some(value) => op.apply(value, literal),
        None if response.is_blank() => {
            // Blank responses land here constantly; that is the normal
            // shape of skipped downstream questions, not an anomaly
            log_debug!("Blank response; comparison is false", "field" => field);
            false
        }
        None => {
            log_warning!(codes::eval::UNCASTABLE_RESPONSE,
                "Response not castable to integer; comparison is false",
                "field" => field,
                "response" => response
            );
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Joiner {
    And,
    Or,
}

/// One level of parenthesized reduction state
#[derive(Debug)]
struct Frame {
    acc: Option<bool>,
    pending: Option<Joiner>,
}

impl Frame {
    fn new() -> Self {
        Self {
            acc: None,
            pending: None,
        }
    }

    fn combine(&mut self, value: bool) {
        self.acc = Some(match (self.acc, self.pending.take()) {
            (None, _) => value,
            (Some(acc), Some(Joiner::And)) => acc && value,
            (Some(acc), Some(Joiner::Or)) => acc || value,
            // Two values with no joiner between them; keep the running value
            (Some(acc), None) => acc && value,
        });
    }

    /// An empty group is vacuously true
    fn result(self) -> bool {
        self.acc.unwrap_or(true)
    }
}

fn set_joiner(frames: &mut [Frame], joiner: Joiner) -> bool {
    match frames.last_mut() {
        Some(frame) => {
            frame.pending = Some(joiner);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Record;
    use crate::syntax::parse;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        let mut map = serde_json::Map::new();
        map.insert("subjid".to_string(), json!("SUBJ001"));
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        Record::from_response("subjid", &map).unwrap()
    }

    fn eval_str(logic: &str, record: &Record) -> bool {
        evaluate(&parse(logic), record)
    }

    #[test]
    fn test_single_comparison_true() {
        let rec = record(&[("a", json!("10")), ("b", json!(""))]);
        assert!(eval_str("a > 5", &rec));
    }

    #[test]
    fn test_blank_operand_fails_conjunction() {
        // Spec property: {a: "10", b: ""} makes `a > 5 and b == 1` false
        let rec = record(&[("a", json!("10")), ("b", json!(""))]);
        assert!(!eval_str("a > 5 and b == 1", &rec));
    }

    #[test]
    fn test_missing_field_is_non_matching() {
        let rec = record(&[("a", json!("10"))]);
        assert!(!eval_str("ghost == 1", &rec));
        assert!(!eval_str("a > 5 and ghost == 1", &rec));
        // Still recoverable through the other arm of an or
        assert!(eval_str("ghost == 1 or a > 5", &rec));
    }

    #[test]
    fn test_no_logic_is_always_eligible() {
        let rec = record(&[]);
        assert!(eval_str("", &rec));
        // Exists but unreadable: same treatment
        assert!(eval_str("a >", &rec));
    }

    #[test]
    fn test_strict_left_to_right_no_precedence() {
        // With and-precedence this would be true; left-to-right it is false:
        // (true or true) and false
        let rec = record(&[("a", json!(1)), ("b", json!(1)), ("c", json!(0))]);
        assert!(!eval_str("a == 1 or b == 1 and c == 1", &rec));
    }

    #[test]
    fn test_parenthesized_group_reduces_as_unit() {
        let rec = record(&[("a", json!(0)), ("b", json!(1)), ("c", json!(1))]);
        // false and true or true -> left-to-right without parens: true
        assert!(eval_str("a == 1 and b == 1 or c == 1", &rec));
        // false and (true or true) -> false
        assert!(!eval_str("a == 1 and (b == 1 or c == 1)", &rec));
    }

    #[test]
    fn test_nested_groups() {
        let rec = record(&[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]);
        assert!(eval_str("a == 1 and ((b == 2 or c == 9) and c == 3)", &rec));
        assert!(!eval_str("a == 1 and ((b == 9 or c == 9) and c == 3)", &rec));
    }

    #[test]
    fn test_numeric_and_string_responses_compare_alike() {
        let rec = record(&[("s", json!("7")), ("n", json!(7))]);
        assert!(eval_str("s == 7", &rec));
        assert!(eval_str("n == 7", &rec));
        assert!(eval_str("s >= 7 and n <= 7", &rec));
    }

    #[test]
    fn test_boolean_responses_cast_to_ints() {
        let rec = record(&[("flag", json!(true)), ("off", json!(false))]);
        assert!(eval_str("flag == 1", &rec));
        assert!(eval_str("off == 0", &rec));
    }

    #[test]
    fn test_fractional_response_fails_cast() {
        let rec = record(&[("w", json!("22.5"))]);
        assert!(!eval_str("w > 1", &rec));
        assert!(!eval_str("w == 22", &rec));
    }

    #[test]
    fn test_negative_sentinel_comparisons() {
        let rec = record(&[("x", json!("-777"))]);
        assert!(eval_str("x == -777", &rec));
        assert!(eval_str("x != -555", &rec));
    }

    #[test]
    fn test_live_dictionary_expression() {
        let rec = record(&[
            ("current_country", json!("2")),
            ("lang_number", json!("3")),
        ]);
        assert!(eval_str("current_country == 2 and (lang_number >= 2)", &rec));

        let rec2 = record(&[
            ("current_country", json!("2")),
            ("lang_number", json!("1")),
        ]);
        assert!(!eval_str("current_country == 2 and (lang_number >= 2)", &rec2));
    }
}
