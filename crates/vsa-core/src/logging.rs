//! Structured submission logging.

use tracing::{debug, error, info, warn, Span};
use vsa_models::{Language, RequestId, SubmissionRequest};

use crate::error::SubmissionError;

/// Logger bound to one submission and the operation driving it.
///
/// Every line carries `request_id`, `language` and `operation` so one
/// submission can be followed across both suspension points, including the
/// re-runs triggered by a language change.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: RequestId,
    language: Language,
    operation: &'static str,
}

impl RequestLogger {
    /// Create a logger for `request`, driven by `operation` (`submit`,
    /// `language_change`).
    pub fn for_request(request: &SubmissionRequest, operation: &'static str) -> Self {
        Self {
            request_id: request.id,
            language: request.language.clone(),
            operation,
        }
    }

    /// Log that the pipeline started for `basis`.
    pub fn log_start(&self, basis: &str) {
        info!(
            request_id = %self.request_id,
            language = %self.language,
            operation = self.operation,
            "Submission started: {}", basis
        );
    }

    /// Log that the submission passed a stage (`validated`, `generating`).
    pub fn log_stage(&self, stage: &str) {
        info!(
            request_id = %self.request_id,
            operation = self.operation,
            stage,
            "Submission reached stage"
        );
    }

    /// Log a validator rejection. Not an error: the user corrects the input.
    pub fn log_rejected(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = self.operation,
            "Reference rejected: {}", message
        );
    }

    /// Log a failure that moved the lifecycle into `Error`.
    pub fn log_failure(&self, err: &SubmissionError) {
        error!(
            request_id = %self.request_id,
            operation = self.operation,
            error_kind = err.kind(),
            "Submission failed: {}", err
        );
    }

    /// Log a published analysis.
    pub fn log_ready(&self, chars: usize) {
        info!(
            request_id = %self.request_id,
            language = %self.language,
            operation = self.operation,
            chars,
            "Analysis ready"
        );
    }

    /// Log that a newer submission made this one's result stale.
    pub fn log_superseded(&self) {
        debug!(
            request_id = %self.request_id,
            operation = self.operation,
            "Discarding result of superseded submission"
        );
    }

    /// Span wrapping the whole pipeline of this submission.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "submission",
            request_id = %self.request_id,
            language = %self.language,
            operation = self.operation
        )
    }
}
