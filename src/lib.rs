//! Branching-logic compiler and missing-value classifier for survey record
//! exports.
//!
//! The pipeline: translate native branching logic to a canonical grammar,
//! parse and evaluate it per record, then rewrite every blank response to a
//! sentinel that states why it is blank ("never eligible" vs "genuinely
//! missing").

// Internal modules
pub mod batch;
pub mod classify;
pub mod config;
#[macro_use]
pub mod diagnostics;
pub mod eval;
pub mod lexical;
pub mod records;
pub mod syntax;
pub mod tokens;
pub mod translate;

// Re-export key types for library consumers
pub use batch::{classify_record_set, BatchResults};
pub use classify::{Classifier, SequencingError};
pub use config::ClassifierSettings;
pub use eval::evaluate;
pub use records::{
    DataDictionary, FieldDefinition, LogicFormat, Record, RecordSet, RecordStage, ResponseValue,
};
pub use syntax::{parse, ParsedLogic};
pub use translate::translate;
