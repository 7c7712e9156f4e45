//! Submission metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is up to
//! the embedding binary.

use std::time::Duration;

use metrics::{counter, histogram};

pub mod names {
    /// Submissions by outcome.
    pub const SUBMISSIONS_TOTAL: &str = "vsa_submissions_total";

    /// Results dropped because a newer submission was current, by stage.
    pub const STALE_RESULTS_TOTAL: &str = "vsa_stale_results_total";

    /// Generation call latency in seconds.
    pub const GENERATION_SECONDS: &str = "vsa_generation_seconds";
}

/// Count a finished submission by outcome label.
pub fn record_submission(outcome: &'static str) {
    counter!(names::SUBMISSIONS_TOTAL, "outcome" => outcome).increment(1);
}

/// Count a result dropped because its id was no longer current.
pub fn record_stale_result(stage: &'static str) {
    counter!(names::STALE_RESULTS_TOTAL, "stage" => stage).increment(1);
}

/// Record how long the generation call and parse took.
pub fn record_generation_latency(elapsed: Duration) {
    histogram!(names::GENERATION_SECONDS).record(elapsed.as_secs_f64());
}
