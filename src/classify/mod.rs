//! Missing-value classification pipeline
//!
//! Every blank in a raw export is one of two things: the question was never
//! eligible to be asked (skip logic suppressed it) or the answer is genuinely
//! missing. The classifier rewrites each blank to the matching sentinel in
//! three strictly ordered stages:
//!
//! 1. LOGIC_FILLED: canonical branching logic is attached per field
//! 2. NA_FILLED: blanks whose logic evaluates false become the NA sentinel
//! 3. BAD_FILLED: remaining blanks become the bad-data sentinel
//!
//! Re-running a completed stage is a no-op; skipping a stage is a hard error.
//! BAD_FILLED depends on NA_FILLED having consumed every explainable blank,
//! so an out-of-order run would stamp "bad data" on responses that were never
//! eligible, and that mislabel is indistinguishable from real bad data
//! afterwards.

use crate::config::constants::compile_time::classify::COMPLETE_SUFFIX;
use crate::config::ClassifierSettings;
use crate::diagnostics::codes;
use crate::diagnostics::with_record_context;
use crate::eval::evaluate;
use crate::records::{split_choice_field, DataDictionary, Record, RecordStage, ResponseValue};
use crate::syntax::parse;
use crate::{log_error, log_success, log_warning};

/// A classification stage was requested out of order.
///
/// Not recoverable for the record in question: the caller must rebuild it
/// from the raw export and rerun the stages in order.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Record '{record_id}': cannot enter stage {requested} from {current}; \
     stages advance strictly in order"
)]
pub struct SequencingError {
    pub record_id: String,
    pub current: RecordStage,
    pub requested: RecordStage,
}

impl SequencingError {
    pub fn error_code(&self) -> crate::diagnostics::Code {
        codes::classify::STAGE_OUT_OF_ORDER
    }
}

enum StageGate {
    /// Stage already completed; the operation is a no-op
    AlreadyDone,
    /// Prerequisite satisfied; perform the stage and advance
    Perform,
}

/// Drives records through the classification stages against one data
/// dictionary's branching logic.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    /// Run all three stages on one record. Safe to call on a partially
    /// processed record; completed stages are skipped.
    pub fn classify(
        &self,
        record: &mut Record,
        dictionary: &DataDictionary,
    ) -> Result<(), SequencingError> {
        self.attach_logic(record, dictionary)?;
        let na_filled = self.fill_not_applicable(record)?;
        let bad_filled = self.fill_bad_data(record)?;

        let record_id = record.id().to_string();
        with_record_context(&record_id, || {
            log_success!(codes::success::RECORD_CLASSIFIED,
                "Record classified",
                "stage" => record.stage(),
                "na_filled" => na_filled,
                "bad_filled" => bad_filled
            );
        });
        Ok(())
    }

    /// Stage 1: attach each field's canonical branching logic from the
    /// dictionary.
    pub fn attach_logic(
        &self,
        record: &mut Record,
        dictionary: &DataDictionary,
    ) -> Result<(), SequencingError> {
        match self.gate(record, RecordStage::LogicFilled)? {
            StageGate::AlreadyDone => return Ok(()),
            StageGate::Perform => {}
        }

        let record_id = record.id().to_string();
        with_record_context(&record_id, || {
            for name in record.field_names() {
                let logic = resolve_logic(&name, dictionary);
                record.set_logic(&name, logic);
            }
        });
        record.set_stage(RecordStage::LogicFilled);
        Ok(())
    }

    /// Stage 2: rewrite blanks whose logic evaluates false to the NA
    /// sentinel. For checkbox choice fields the unchecked value counts as
    /// blank, since an ineligible checkbox exports as unchecked rather than
    /// empty. Returns the number of fields filled.
    ///
    /// Eligibility is decided against the record's pre-fill responses;
    /// sentinels written by this stage never feed back into logic evaluated
    /// in the same pass.
    pub fn fill_not_applicable(&self, record: &mut Record) -> Result<usize, SequencingError> {
        match self.gate(record, RecordStage::NaFilled)? {
            StageGate::AlreadyDone => return Ok(0),
            StageGate::Perform => {}
        }

        let record_id = record.id().to_string();
        let fills = with_record_context(&record_id, || {
            let mut fills = Vec::new();
            for name in record.field_names() {
                let response = match record.response(&name) {
                    Some(response) => response,
                    None => continue,
                };
                let is_choice = split_choice_field(&name).1.is_some();
                let blankish =
                    response.is_blank() || (is_choice && response.is_unchecked());
                if !blankish {
                    continue;
                }
                let logic = record.logic_for(&name).unwrap_or("");
                if !evaluate(&parse(logic), record) {
                    fills.push(name);
                }
            }
            fills
        });

        for name in &fills {
            record.set_response(name, ResponseValue::Int(self.settings.na_code));
        }
        record.set_stage(RecordStage::NaFilled);
        Ok(fills.len())
    }

    /// Stage 3: rewrite the remaining blanks to the bad-data sentinel.
    /// These fields were eligible to be answered and were not. Unchecked
    /// checkboxes of eligible questions are a legitimate answer and stay as
    /// exported. Returns the number of fields filled.
    pub fn fill_bad_data(&self, record: &mut Record) -> Result<usize, SequencingError> {
        match self.gate(record, RecordStage::BadFilled)? {
            StageGate::AlreadyDone => return Ok(0),
            StageGate::Perform => {}
        }

        let blanks: Vec<String> = record
            .responses()
            .filter(|(_, response)| response.is_blank())
            .map(|(name, _)| name.to_string())
            .collect();
        for name in &blanks {
            record.set_response(name, ResponseValue::Int(self.settings.bad_code));
        }
        record.set_stage(RecordStage::BadFilled);
        Ok(blanks.len())
    }

    fn gate(&self, record: &Record, target: RecordStage) -> Result<StageGate, SequencingError> {
        if record.stage() >= target {
            return Ok(StageGate::AlreadyDone);
        }
        if target.prerequisite() == Some(record.stage()) {
            return Ok(StageGate::Perform);
        }

        let err = SequencingError {
            record_id: record.id().to_string(),
            current: record.stage(),
            requested: target,
        };
        log_error!(codes::classify::STAGE_OUT_OF_ORDER,
            "Classification stage requested out of order",
            "record_id" => err.record_id,
            "current" => err.current,
            "requested" => err.requested
        );
        Err(err)
    }
}

/// Resolve one exported field name to its canonical branching logic.
///
/// Checkbox choices export as `base___code` and inherit the base field's
/// logic. Form-status fields (`*_complete`) are platform-generated, carry no
/// logic, and are expected to be absent from the dictionary, so they bind
/// silently; any other unknown field raises a diagnostic before binding to
/// always-eligible.
fn resolve_logic(field_name: &str, dictionary: &DataDictionary) -> String {
    if let Some(logic) = dictionary.canonical_logic_for(field_name) {
        return logic;
    }

    if field_name.ends_with(COMPLETE_SUFFIX) {
        return String::new();
    }

    let (base, choice) = split_choice_field(field_name);
    if choice.is_some() {
        if let Some(definition) = dictionary.get(base) {
            if !definition.is_checkbox() {
                log_warning!(codes::classify::AMBIGUOUS_CHOICE_BINDING,
                    "Field splits like a checkbox choice but its base field is not a checkbox",
                    "field" => field_name,
                    "base" => base,
                    "base_type" => definition.field_type
                );
            }
            return dictionary.canonical_logic_for(base).unwrap_or_default();
        }
    }

    log_warning!(codes::classify::FIELD_NOT_IN_DICTIONARY,
        "Exported field has no dictionary entry; treating as always eligible",
        "field" => field_name
    );
    String::new()
}
