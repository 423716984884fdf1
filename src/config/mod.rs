//! Configuration for the branching-logic pipeline
//!
//! Compile-time bounds live in `constants`; per-run knobs (primary key,
//! sentinel codes) live in `runtime`. There is no file-based configuration:
//! credential and connection handling belong to the transport layer that
//! feeds this crate already-materialized data.

pub mod constants;
pub mod runtime;

pub use runtime::ClassifierSettings;
