//! Bulk classification over a record set
//!
//! One failed record must not take down a bulk run: exports routinely mix
//! freshly pulled records with ones a previous run already processed, and
//! the operator wants one pass that finishes the stragglers and reports what
//! happened.

use std::time::Instant;

use crate::classify::Classifier;
use crate::diagnostics::codes;
use crate::log_success;
use crate::records::{DataDictionary, RecordSet, RecordStage};

/// Outcome of one bulk classification run
#[derive(Debug, Clone)]
pub struct BatchResults {
    /// Records advanced to BAD_FILLED by this run
    pub classified: Vec<String>,
    /// Records that were already terminal when the run started
    pub skipped: Vec<String>,
    /// Records whose classification failed, with the failure rendered
    pub failed: Vec<(String, String)>,
    /// Wall-clock duration of the run
    pub duration: std::time::Duration,
}

impl BatchResults {
    pub fn total(&self) -> usize {
        self.classified.len() + self.skipped.len() + self.failed.len()
    }

    /// Fraction of attempted records that classified cleanly
    pub fn success_rate(&self) -> f64 {
        let attempted = self.classified.len() + self.failed.len();
        if attempted == 0 {
            return 1.0;
        }
        self.classified.len() as f64 / attempted as f64
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line operator summary
    pub fn summary(&self) -> String {
        format!(
            "{} classified, {} skipped, {} failed in {:.1?}",
            self.classified.len(),
            self.skipped.len(),
            self.failed.len(),
            self.duration
        )
    }
}

/// Classify every record in the set against one dictionary.
///
/// Records already at BAD_FILLED are skipped; partially processed records
/// resume from their current stage. A record that fails sequencing is
/// reported in the results and the run continues.
pub fn classify_record_set(
    records: &mut RecordSet,
    dictionary: &DataDictionary,
    classifier: &Classifier,
) -> BatchResults {
    let started = Instant::now();
    let mut classified = Vec::new();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();

    for (id, record) in records.iter_mut() {
        if record.stage() == RecordStage::BadFilled {
            skipped.push(id.to_string());
            continue;
        }
        match classifier.classify(record, dictionary) {
            Ok(()) => classified.push(id.to_string()),
            Err(err) => failed.push((id.to_string(), err.to_string())),
        }
    }

    classified.sort();
    skipped.sort();
    failed.sort();

    let results = BatchResults {
        classified,
        skipped,
        failed,
        duration: started.elapsed(),
    };
    log_success!(codes::success::BATCH_COMPLETE,
        "Record set classified",
        "classified" => results.classified.len(),
        "skipped" => results.skipped.len(),
        "failed" => results.failed.len()
    );
    results
}
