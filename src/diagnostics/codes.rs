//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all diagnostic codes, their metadata, and
//! classification functions. Warning-class codes (W...) mark data-shape
//! anomalies that were recovered with a safe default; error-class codes
//! (E...) mark failures surfaced to the caller.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning, and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl CodeMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// DOMAIN CODE CONSTANTS
// ============================================================================

pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E010");
    pub const INVALID_NUMBER: Code = Code::new("E011");
    pub const EXPRESSION_TOO_LONG: Code = Code::new("E012");
    pub const FIELD_REF_TOO_LONG: Code = Code::new("E013");
    pub const TOO_MANY_TOKENS: Code = Code::new("E014");
}

pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E020");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E021");
    pub const TRAILING_INPUT: Code = Code::new("E022");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E023");
    pub const MALFORMED_EXPRESSION: Code = Code::new("W020");
}

pub mod eval {
    use super::Code;

    pub const UNRESOLVED_FIELD_REFERENCE: Code = Code::new("W030");
    pub const UNCASTABLE_RESPONSE: Code = Code::new("W031");
    pub const MALFORMED_TOKEN_SEQUENCE: Code = Code::new("W032");
}

pub mod classify {
    use super::Code;

    pub const STAGE_OUT_OF_ORDER: Code = Code::new("E040");
    pub const AMBIGUOUS_CHOICE_BINDING: Code = Code::new("W041");
    pub const FIELD_NOT_IN_DICTIONARY: Code = Code::new("W042");
}

pub mod records {
    use super::Code;

    pub const DUPLICATE_FIELD_NAME: Code = Code::new("E050");
    pub const MISSING_PRIMARY_KEY: Code = Code::new("E051");
}

pub mod success {
    use super::Code;

    pub const LOGIC_CONVERSION_COMPLETE: Code = Code::new("S001");
    pub const RECORD_CLASSIFIED: Code = Code::new("S002");
    pub const BATCH_COMPLETE: Code = Code::new("S003");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("S004");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn build_registry() -> HashMap<&'static str, CodeMetadata> {
    let entries = [
        // Lexical
        CodeMetadata::new(
            "E010",
            "lexical",
            Severity::Medium,
            true,
            false,
            "Character not valid in canonical branching logic",
            "Check the native logic string for unsupported syntax",
        ),
        CodeMetadata::new(
            "E011",
            "lexical",
            Severity::Medium,
            true,
            false,
            "Integer literal could not be read",
            "Branching logic only supports integer comparison values",
        ),
        CodeMetadata::new(
            "E012",
            "lexical",
            Severity::High,
            true,
            false,
            "Canonical expression exceeds the length bound",
            "Split the branching logic across fields in the survey designer",
        ),
        CodeMetadata::new(
            "E013",
            "lexical",
            Severity::Medium,
            true,
            false,
            "Field reference exceeds the length bound",
            "Shorten the field name in the survey designer",
        ),
        CodeMetadata::new(
            "E014",
            "lexical",
            Severity::High,
            true,
            false,
            "Expression produced too many tokens",
            "Split the branching logic across fields in the survey designer",
        ),
        // Syntax
        CodeMetadata::new(
            "E020",
            "syntax",
            Severity::Medium,
            true,
            false,
            "Token not permitted at this position in the chain grammar",
            "Verify the logic is comparisons joined by and/or",
        ),
        CodeMetadata::new(
            "E021",
            "syntax",
            Severity::Medium,
            true,
            false,
            "Expression ended inside a comparison or after a joiner",
            "Complete the trailing comparison",
        ),
        CodeMetadata::new(
            "E022",
            "syntax",
            Severity::Medium,
            true,
            false,
            "Tokens remain after a complete chain",
            "Remove trailing content or join it with and/or",
        ),
        CodeMetadata::new(
            "E023",
            "syntax",
            Severity::High,
            true,
            false,
            "Parenthesis nesting exceeds the recursion bound",
            "Flatten the branching logic",
        ),
        CodeMetadata::new(
            "W020",
            "syntax",
            Severity::Low,
            true,
            false,
            "Non-empty logic failed to parse; field treated as always eligible",
            "Inspect the field's branching logic; blanks may be over-flagged",
        ),
        // Evaluation
        CodeMetadata::new(
            "W030",
            "eval",
            Severity::Low,
            true,
            false,
            "Referenced field absent from the record; comparison treated as false",
            "Check for renamed or removed fields in the data dictionary",
        ),
        CodeMetadata::new(
            "W031",
            "eval",
            Severity::Low,
            true,
            false,
            "Response could not be cast to an integer; comparison treated as false",
            "Expected for blank responses; investigate if frequent on filled fields",
        ),
        CodeMetadata::new(
            "W032",
            "eval",
            Severity::Low,
            true,
            false,
            "Token sequence inconsistent during reduction; expression treated as false",
            "Report the offending logic string",
        ),
        // Classification
        CodeMetadata::new(
            "E040",
            "classify",
            Severity::Critical,
            false,
            true,
            "Classification stage invoked before its prerequisite completed",
            "Run stages in order: logic fill, NA fill, bad-data fill",
        ),
        CodeMetadata::new(
            "W041",
            "classify",
            Severity::Low,
            true,
            false,
            "Field name splits like a checkbox choice but its base is not a checkbox",
            "Check for plain fields whose names contain the choice separator",
        ),
        CodeMetadata::new(
            "W042",
            "classify",
            Severity::Low,
            true,
            false,
            "Record field missing from the data dictionary",
            "Re-export the data dictionary if fields were added",
        ),
        // Records
        CodeMetadata::new(
            "E050",
            "records",
            Severity::High,
            false,
            false,
            "Duplicate field name in metadata",
            "Field names must be unique within a data dictionary",
        ),
        CodeMetadata::new(
            "E051",
            "records",
            Severity::High,
            false,
            false,
            "Primary-key field absent from a raw response",
            "Verify the configured primary key matches the export",
        ),
        // Success
        CodeMetadata::new(
            "S001",
            "success",
            Severity::Low,
            true,
            false,
            "Data dictionary logic converted to canonical form",
            "None",
        ),
        CodeMetadata::new(
            "S002",
            "success",
            Severity::Low,
            true,
            false,
            "Record classification completed",
            "None",
        ),
        CodeMetadata::new(
            "S003",
            "success",
            Severity::Low,
            true,
            false,
            "Record set batch classification completed",
            "None",
        ),
        CodeMetadata::new(
            "S004",
            "success",
            Severity::Low,
            true,
            false,
            "Diagnostics system initialized",
            "None",
        ),
    ];

    entries.into_iter().map(|m| (m.code, m)).collect()
}

fn registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(build_registry)
}

// ============================================================================
// LOOKUP FUNCTIONS
// ============================================================================

pub fn get_metadata(code: &str) -> Option<&'static CodeMetadata> {
    registry().get(code)
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code).map_or("Unknown code", |m| m.description)
}

pub fn get_category(code: &str) -> &'static str {
    get_metadata(code).map_or("unknown", |m| m.category)
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code).map_or(Severity::Medium, |m| m.severity)
}

pub fn get_action(code: &str) -> &'static str {
    get_metadata(code).map_or("None", |m| m.recommended_action)
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code).map_or(true, |m| m.recoverable)
}

pub fn requires_halt(code: &str) -> bool {
    get_metadata(code).map_or(false, |m| m.requires_halt)
}
