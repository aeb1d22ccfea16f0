//! Batch generation: input parsing, bounded-concurrency runs and the
//! iteration manifest.

pub mod input;
pub mod manifest;
pub mod runner;

pub use input::{load_batch_file, parse_csv, parse_json};
pub use manifest::{IterationRecord, LogoSummary, MANIFEST_FILE, append_iteration, load_manifest};
pub use runner::{
    BatchFailure, BatchJob, BatchOutcome, BatchRunner, BatchStats, DEFAULT_CONCURRENCY, preview,
};
