//! Data model for survey metadata and responses
//!
//! Explicit structs over ordered maps, with a stage enum gating the
//! classification pipeline; nothing here inherits from a general tabular
//! abstraction. Metadata rows and raw records arrive as already-materialized
//! JSON from the transport layer this crate does not own.

use crate::config::constants::compile_time::classify::CHOICE_SEPARATOR;
use crate::diagnostics::codes;
use crate::translate::translate;
use crate::{log_success, log_warning};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// RESPONSE VALUES
// ============================================================================

/// One field's current response within a record.
///
/// Raw exports are string-heavy, but the platform emits bare numbers and
/// booleans for some field types, and sentinel fills write integers; all four
/// shapes flow through the same comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ResponseValue {
    /// Build from a raw JSON export value. Null becomes a blank response;
    /// structured values keep their JSON rendering so nothing is dropped.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => Self::Text(other.to_string()),
        }
    }

    /// A blank response: the empty string the export writes whether the
    /// question was skipped or left unanswered
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// An unchecked checkbox choice. The live export represents these as
    /// both numeric `0` and string `"0"` depending on export settings, so
    /// both match.
    pub fn is_unchecked(&self) -> bool {
        matches!(self, Self::Int(0)) || matches!(self, Self::Text(s) if s == "0")
    }

    /// Cast to an integer for comparison. Fractional values do not cast; the
    /// branching-logic grammar has no float literals to compare them with.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    /// Render for record-id use and diagnostics
    pub fn as_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display_string())
    }
}

impl From<i64> for ResponseValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Record construction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordError {
    #[error("Primary-key field '{field}' absent from raw response")]
    MissingPrimaryKey { field: String },

    #[error("Primary-key field '{field}' is blank")]
    BlankPrimaryKey { field: String },
}

impl RecordError {
    pub fn error_code(&self) -> crate::diagnostics::Code {
        match self {
            RecordError::MissingPrimaryKey { .. } | RecordError::BlankPrimaryKey { .. } => {
                codes::records::MISSING_PRIMARY_KEY
            }
        }
    }
}

/// Data dictionary construction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DictionaryError {
    #[error("Duplicate field name in metadata: '{field}'")]
    DuplicateFieldName { field: String },
}

impl DictionaryError {
    pub fn error_code(&self) -> crate::diagnostics::Code {
        match self {
            DictionaryError::DuplicateFieldName { .. } => codes::records::DUPLICATE_FIELD_NAME,
        }
    }
}

// ============================================================================
// FIELD METADATA AND DATA DICTIONARY
// ============================================================================

/// One field's metadata row, as the metadata collaborator exports it.
/// Unknown columns (labels, validation bounds, form names) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field_name: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub branching_logic: Option<String>,
}

impl FieldDefinition {
    pub fn new(field_name: &str, field_type: &str, branching_logic: Option<&str>) -> Self {
        Self {
            field_name: field_name.to_string(),
            field_type: field_type.to_string(),
            branching_logic: branching_logic.map(str::to_string),
        }
    }

    /// Checkbox fields export each choice as an independent sub-field
    pub fn is_checkbox(&self) -> bool {
        self.field_type == "checkbox"
    }

    /// The logic string in whatever format the dictionary currently holds,
    /// with absence flattened to the empty "always eligible" string
    pub fn logic(&self) -> &str {
        self.branching_logic.as_deref().unwrap_or("")
    }
}

/// Current format of a dictionary's branching-logic strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicFormat {
    /// As exported by the platform: bracketed references, bare `=`, `<>`
    Native,
    /// Rewritten for the evaluator's grammar
    Canonical,
}

/// Ordered field_name → FieldDefinition mapping for one survey project.
///
/// Built once from metadata and mutated only by the one-way native →
/// canonical logic conversion.
#[derive(Debug, Clone)]
pub struct DataDictionary {
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
    format: LogicFormat,
}

impl DataDictionary {
    /// Build from metadata rows, preserving export order. Field names must
    /// be unique.
    pub fn from_metadata(rows: Vec<FieldDefinition>) -> Result<Self, DictionaryError> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.field_name.clone(), i).is_some() {
                return Err(DictionaryError::DuplicateFieldName {
                    field: row.field_name.clone(),
                });
            }
        }
        Ok(Self {
            fields: rows,
            index,
            format: LogicFormat::Native,
        })
    }

    /// Build from the metadata collaborator's JSON array
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let rows: Vec<FieldDefinition> = serde_json::from_str(raw)?;
        // Serde cannot express the uniqueness invariant; surface it through
        // the same error path callers of from_metadata use
        Self::from_metadata(rows).map_err(serde::de::Error::custom)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn format(&self) -> LogicFormat {
        self.format
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldDefinition> {
        self.index.get(field_name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.index.contains_key(field_name)
    }

    /// Fields in export order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter()
    }

    /// Names of all checkbox fields
    pub fn checkboxes(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_checkbox())
            .map(|f| f.field_name.as_str())
            .collect()
    }

    /// Convert every field's logic to canonical form. One-way and
    /// idempotent: repeat calls are no-ops.
    pub fn make_canonical(&mut self) {
        if self.format == LogicFormat::Canonical {
            return;
        }
        let mut converted = 0usize;
        for field in &mut self.fields {
            if let Some(logic) = &field.branching_logic {
                if !logic.is_empty() {
                    field.branching_logic = Some(translate(logic));
                    converted += 1;
                }
            }
        }
        self.format = LogicFormat::Canonical;
        log_success!(codes::success::LOGIC_CONVERSION_COMPLETE,
            "Data dictionary logic converted to canonical form",
            "fields" => self.fields.len(),
            "converted" => converted
        );
    }

    /// Canonical logic for one field, translating on the fly when the
    /// dictionary still holds native strings. Absent logic is the empty
    /// "always eligible" string.
    pub fn canonical_logic_for(&self, field_name: &str) -> Option<String> {
        let field = self.get(field_name)?;
        let logic = field.logic();
        Some(match self.format {
            LogicFormat::Canonical => logic.to_string(),
            LogicFormat::Native => translate(logic),
        })
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Classification stage of a record. Strictly monotonic: each stage is
/// reachable only from its predecessor, and re-entering a completed stage is
/// a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordStage {
    /// As built from the raw response map
    Raw,
    /// Canonical branching logic attached per field
    LogicFilled,
    /// Not-applicable blanks rewritten to the NA sentinel
    NaFilled,
    /// Remaining blanks rewritten to the bad-data sentinel; terminal
    BadFilled,
}

impl RecordStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::LogicFilled => "LOGIC_FILLED",
            Self::NaFilled => "NA_FILLED",
            Self::BadFilled => "BAD_FILLED",
        }
    }

    /// The stage that must have completed before this one may run
    pub fn prerequisite(&self) -> Option<Self> {
        match self {
            Self::Raw => None,
            Self::LogicFilled => Some(Self::Raw),
            Self::NaFilled => Some(Self::LogicFilled),
            Self::BadFilled => Some(Self::NaFilled),
        }
    }
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
struct FieldSlot {
    name: String,
    response: ResponseValue,
    /// Canonical branching logic, attached at LOGIC_FILLED
    logic: Option<String>,
}

/// One survey response: an ordered field_name → response mapping plus the
/// classification stage it has reached.
#[derive(Debug, Clone)]
pub struct Record {
    id: String,
    slots: Vec<FieldSlot>,
    index: HashMap<String, usize>,
    stage: RecordStage,
}

impl Record {
    /// Build from one raw response map, taking identity from the configured
    /// primary-key field. Field order follows the map's order.
    pub fn from_response(
        primary_key: &str,
        data: &serde_json::Map<String, Value>,
    ) -> Result<Self, RecordError> {
        let id_value = data
            .get(primary_key)
            .ok_or_else(|| RecordError::MissingPrimaryKey {
                field: primary_key.to_string(),
            })?;
        let id = ResponseValue::from_json(id_value).as_display_string();
        if id.is_empty() {
            return Err(RecordError::BlankPrimaryKey {
                field: primary_key.to_string(),
            });
        }

        let mut slots = Vec::with_capacity(data.len());
        let mut index = HashMap::with_capacity(data.len());
        for (name, value) in data {
            index.insert(name.clone(), slots.len());
            slots.push(FieldSlot {
                name: name.clone(),
                response: ResponseValue::from_json(value),
                logic: None,
            });
        }

        Ok(Self {
            id,
            slots,
            index,
            stage: RecordStage::Raw,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage(&self) -> RecordStage {
        self.stage
    }

    pub(crate) fn set_stage(&mut self, stage: RecordStage) {
        self.stage = stage;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_field(&self, field_name: &str) -> bool {
        self.index.contains_key(field_name)
    }

    /// Current response for one field
    pub fn response(&self, field_name: &str) -> Option<&ResponseValue> {
        self.index.get(field_name).map(|&i| &self.slots[i].response)
    }

    /// Overwrite one field's response, warning when the field is new; the
    /// export should already carry every field the dictionary knows
    pub fn set_response(&mut self, field_name: &str, value: ResponseValue) {
        match self.index.get(field_name) {
            Some(&i) => self.slots[i].response = value,
            None => {
                log_warning!(codes::classify::FIELD_NOT_IN_DICTIONARY,
                    "Creating a field the raw response did not carry",
                    "field" => field_name
                );
                self.index.insert(field_name.to_string(), self.slots.len());
                self.slots.push(FieldSlot {
                    name: field_name.to_string(),
                    response: value,
                    logic: None,
                });
            }
        }
    }

    /// Canonical logic attached to one field, if the record has reached
    /// LOGIC_FILLED
    pub fn logic_for(&self, field_name: &str) -> Option<&str> {
        self.index
            .get(field_name)
            .and_then(|&i| self.slots[i].logic.as_deref())
    }

    pub(crate) fn set_logic(&mut self, field_name: &str, logic: String) {
        if let Some(&i) = self.index.get(field_name) {
            self.slots[i].logic = Some(logic);
        }
    }

    /// Field names in export order
    pub fn field_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// (name, response) pairs in export order
    pub fn responses(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.slots.iter().map(|s| (s.name.as_str(), &s.response))
    }

    /// Response cast to an integer, the way the evaluator sees it
    pub fn int_value(&self, field_name: &str) -> Option<i64> {
        self.response(field_name).and_then(ResponseValue::as_int)
    }
}

// ============================================================================
// RECORD SET
// ============================================================================

/// Maps record ids to records for bulk operations. Output of batch
/// classification is keyed by id, so iteration order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: HashMap<String, Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a bulk export: one raw response map per record. A repeated
    /// id keeps the later record, matching the platform's own export
    /// behavior for re-pulled data.
    pub fn from_responses(
        primary_key: &str,
        responses: &[serde_json::Map<String, Value>],
    ) -> Result<Self, RecordError> {
        let mut set = Self::new();
        for data in responses {
            set.insert(Record::from_response(primary_key, data)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id().to_string(), record);
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Record)> {
        self.records.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

/// Split an exported field name into its checkbox base and choice code.
/// `meds___999` gives `("meds", Some("999"))`; plain fields come back whole.
pub fn split_choice_field(field_name: &str) -> (&str, Option<&str>) {
    match field_name.split_once(CHOICE_SEPARATOR) {
        Some((base, choice)) if !base.is_empty() => (base, Some(choice)),
        _ => (field_name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn fake_metadata() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("idvar", "text", None),
            FieldDefinition::new("Var5", "text", None),
            FieldDefinition::new("Var8", "text", None),
            FieldDefinition::new("Var9", "text", Some("[Var5] < 20")),
            FieldDefinition::new("Var10", "text", Some("[Var8] = -10")),
            FieldDefinition::new("meds", "checkbox", Some("[Var5] > 1")),
        ]
    }

    fn fake_response() -> serde_json::Map<String, Value> {
        let mut map = serde_json::Map::new();
        map.insert("idvar".to_string(), json!("ABC12345678"));
        map.insert("Var5".to_string(), json!(16));
        map.insert("Var8".to_string(), json!("-10"));
        map.insert("Var9".to_string(), json!(""));
        map.insert("Var10".to_string(), json!(""));
        map.insert("meds___1".to_string(), json!("0"));
        map
    }

    #[test]
    fn test_record_construction_from_raw_response() {
        let record = Record::from_response("idvar", &fake_response()).unwrap();
        assert_eq!(record.id(), "ABC12345678");
        assert_eq!(record.stage(), RecordStage::Raw);
        assert_eq!(record.response("Var5"), Some(&ResponseValue::Int(16)));
        assert_eq!(record.int_value("Var8"), Some(-10));
        assert!(record.response("Var9").unwrap().is_blank());
        assert_eq!(record.response("VarNotReal"), None);
    }

    #[test]
    fn test_record_requires_primary_key() {
        let record = Record::from_response("subjid", &fake_response());
        assert_matches!(record, Err(RecordError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn test_dictionary_rejects_duplicate_fields() {
        let mut rows = fake_metadata();
        rows.push(FieldDefinition::new("Var5", "text", None));
        assert_matches!(
            DataDictionary::from_metadata(rows),
            Err(DictionaryError::DuplicateFieldName { field }) if field == "Var5"
        );
    }

    #[test]
    fn test_dictionary_conversion_is_one_way_idempotent() {
        let mut dict = DataDictionary::from_metadata(fake_metadata()).unwrap();
        assert_eq!(dict.format(), LogicFormat::Native);

        dict.make_canonical();
        assert_eq!(dict.format(), LogicFormat::Canonical);
        assert_eq!(dict.get("Var9").unwrap().logic(), "Var5 < 20");
        assert_eq!(dict.get("Var10").unwrap().logic(), "Var8 == -10");

        let snapshot: Vec<String> = dict.iter().map(|f| f.logic().to_string()).collect();
        dict.make_canonical();
        let again: Vec<String> = dict.iter().map(|f| f.logic().to_string()).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_canonical_logic_translates_on_native_dictionaries() {
        let dict = DataDictionary::from_metadata(fake_metadata()).unwrap();
        assert_eq!(
            dict.canonical_logic_for("Var10").as_deref(),
            Some("Var8 == -10")
        );
        assert_eq!(dict.canonical_logic_for("Var5").as_deref(), Some(""));
        assert_eq!(dict.canonical_logic_for("nope"), None);
    }

    #[test]
    fn test_checkbox_listing() {
        let dict = DataDictionary::from_metadata(fake_metadata()).unwrap();
        assert_eq!(dict.checkboxes(), vec!["meds"]);
    }

    #[test]
    fn test_dictionary_from_json_ignores_extra_columns() {
        let raw = r#"[
            {"field_name": "q1", "form_name": "f", "field_type": "radio",
             "field_label": "Q1?", "branching_logic": ""},
            {"field_name": "q2", "form_name": "f", "field_type": "text",
             "branching_logic": "[q1]=1", "required_field": "y"}
        ]"#;
        let dict = DataDictionary::from_json(raw).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("q2").unwrap().logic(), "[q1]=1");
    }

    #[test]
    fn test_stage_ordering() {
        assert!(RecordStage::Raw < RecordStage::LogicFilled);
        assert!(RecordStage::LogicFilled < RecordStage::NaFilled);
        assert!(RecordStage::NaFilled < RecordStage::BadFilled);
        assert_eq!(
            RecordStage::BadFilled.prerequisite(),
            Some(RecordStage::NaFilled)
        );
    }

    #[test]
    fn test_split_choice_field() {
        assert_eq!(split_choice_field("meds___999"), ("meds", Some("999")));
        assert_eq!(split_choice_field("meds____5"), ("meds", Some("_5")));
        assert_eq!(split_choice_field("plain_field"), ("plain_field", None));
    }

    #[test]
    fn test_record_set_keys_by_id() {
        let mut second = fake_response();
        second.insert("idvar".to_string(), json!("DEF00000001"));
        let set = RecordSet::from_responses("idvar", &[fake_response(), second]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("ABC12345678").is_some());
        assert!(set.get("DEF00000001").is_some());
    }

    #[test]
    fn test_unchecked_checkbox_matches_both_exports() {
        assert!(ResponseValue::Int(0).is_unchecked());
        assert!(ResponseValue::from("0").is_unchecked());
        assert!(!ResponseValue::from("1").is_unchecked());
        assert!(!ResponseValue::from("").is_unchecked());
    }
}
