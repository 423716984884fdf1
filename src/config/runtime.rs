// RUNTIME SETTINGS (per-project knobs)

use serde::{Deserialize, Serialize};
use std::env;

use super::constants::compile_time::classify::{DEFAULT_BAD_CODE, DEFAULT_NA_CODE};

/// Settings that vary per survey project rather than per build.
///
/// The sentinel codes are an integration contract with the survey platform:
/// they must not collide with legitimate response codes, which this crate
/// cannot verify on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Field whose response identifies a record within a RecordSet
    pub primary_key: String,

    /// Sentinel written for "not applicable" blanks
    pub na_code: i64,

    /// Sentinel written for unexplained blanks
    pub bad_code: i64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            primary_key: env::var("SKIPLOGIC_PRIMARY_KEY")
                .ok()
                .unwrap_or_else(|| "record_id".to_string()),
            na_code: env::var("SKIPLOGIC_NA_CODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_NA_CODE),
            bad_code: env::var("SKIPLOGIC_BAD_CODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BAD_CODE),
        }
    }
}

impl ClassifierSettings {
    /// Settings with a caller-provided primary key and default sentinels
    pub fn with_primary_key(primary_key: &str) -> Self {
        Self {
            primary_key: primary_key.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sentinels() {
        let settings = ClassifierSettings::with_primary_key("subjid");
        assert_eq!(settings.na_code, -555);
        assert_eq!(settings.bad_code, -444);
        assert_eq!(settings.primary_key, "subjid");
    }
}
