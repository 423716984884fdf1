//! Native-to-canonical branching logic translation
//!
//! The survey platform writes per-field branching logic in its own syntax:
//! field references wrapped in brackets (`[age] >= 18`), checkbox choices as
//! `field(code)`, equality as a bare `=` and inequality as `<>`. The grammar
//! in `syntax` accepts none of that, so every native string is rewritten into
//! canonical form first.
//!
//! Translation never rejects input. A string the rewrite passes cannot make
//! sense of simply fails to parse downstream, where it degrades to "always
//! eligible" with a diagnostic; "no valid logic" and "empty logic" get the
//! same downstream treatment.

use crate::config::constants::compile_time::classify::CHOICE_SEPARATOR;

/// Rewrite one native logic string into canonical syntax.
///
/// Passes run in a fixed order: bracket stripping, checkbox choice rewriting,
/// operator normalization. The result is stable under re-translation, so a
/// dictionary already holding canonical logic can be translated again without
/// damage.
///
/// An empty input (the field has no branching logic) stays empty, which the
/// grammar treats as "always eligible."
pub fn translate(native: &str) -> String {
    if native.trim().is_empty() {
        return String::new();
    }
    let stripped = strip_field_delimiters(native);
    let rewritten = rewrite_choice_references(&stripped);
    normalize_operators(&rewritten)
}

/// Remove the platform's reference-delimiting brackets and stray quotes
/// around field names. `[age] >= 18` becomes `age >= 18`.
fn strip_field_delimiters(logic: &str) -> String {
    logic
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\''))
        .collect()
}

/// Rewrite checkbox choice syntax into export-style references.
///
/// `field(5)` becomes `field___5`, matching how the platform names each
/// choice's sub-field in data exports. A negative choice code keeps an extra
/// underscore (`field(-5)` becomes `field____5`) so it stays distinguishable
/// from a field that simply is not in the dictionary.
fn rewrite_choice_references(logic: &str) -> String {
    let chars: Vec<char> = logic.chars().collect();
    let mut out = String::with_capacity(logic.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !is_ident_char(c) {
            out.push(c);
            i += 1;
            continue;
        }

        // Collect a whole identifier, then look for `(code)` right behind it
        let start = i;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        let ident: String = chars[start..i].iter().collect();

        match scan_choice_suffix(&chars, i) {
            Some((negative, code, end)) => {
                out.push_str(&ident);
                out.push_str(CHOICE_SEPARATOR);
                if negative {
                    out.push('_');
                }
                out.push_str(&code);
                i = end;
            }
            None => out.push_str(&ident),
        }
    }

    out
}

/// Match `(code)` or `(-code)` starting at `pos`; returns the sign, the digit
/// string, and the index past the closing parenthesis.
fn scan_choice_suffix(chars: &[char], pos: usize) -> Option<(bool, String, usize)> {
    let mut i = pos;
    if chars.get(i) != Some(&'(') {
        return None;
    }
    i += 1;

    let negative = chars.get(i) == Some(&'-');
    if negative {
        i += 1;
    }

    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start || chars.get(i) != Some(&')') {
        return None;
    }

    let code: String = chars[digits_start..i].iter().collect();
    Some((negative, code, i + 1))
}

/// Normalize comparison operators to the grammar's set.
///
/// Multi-character operators must be consumed before the bare `=` expansion
/// runs, otherwise `<=` would come out as `<==`. Scanning character pairs in
/// one pass gives that ordering for free: `<=`, `>=`, `==` and `!=` are
/// emitted untouched, `<>` becomes `!=`, and only a `=` that is part of no
/// pair becomes `==`.
fn normalize_operators(logic: &str) -> String {
    let chars: Vec<char> = logic.chars().collect();
    let mut out = String::with_capacity(logic.len() + 4);
    let mut i = 0;

    while i < chars.len() {
        match (chars[i], chars.get(i + 1)) {
            ('<', Some('=')) => {
                out.push_str("<=");
                i += 2;
            }
            ('<', Some('>')) => {
                out.push_str("!=");
                i += 2;
            }
            ('>', Some('=')) => {
                out.push_str(">=");
                i += 2;
            }
            ('!', Some('=')) => {
                out.push_str("!=");
                i += 2;
            }
            ('=', Some('=')) => {
                out.push_str("==");
                i += 2;
            }
            ('=', _) => {
                out.push_str("==");
                i += 1;
            }
            (c, _) => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
