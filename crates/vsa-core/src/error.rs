//! Submission error taxonomy.

use thiserror::Error;
use vsa_gemini::GenerationError;

pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Message used when a failure carries nothing worth showing.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Blank input; the caller refocuses the input field.
    #[error("Input is empty")]
    EmptyInput,

    /// Validator rejected the reference; the user corrects the input.
    #[error("{0}")]
    ValidationFailure(String),

    /// Network, service or unexpected failure of the generation call.
    #[error("{0}")]
    GenerationFailure(String),

    /// The generation call succeeded but its text held no usable envelope.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A newer submission replaced this one; its result was dropped.
    #[error("Superseded by a newer submission")]
    Superseded,
}

impl SubmissionError {
    /// Validator rejection carrying the user-visible reason.
    pub fn validation_failure(msg: impl Into<String>) -> Self {
        Self::ValidationFailure(msg.into())
    }

    /// Generation failure. A blank message becomes the generic one.
    pub fn generation_failed(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.trim().is_empty() {
            return Self::GenerationFailure(UNKNOWN_ERROR_MESSAGE.to_string());
        }
        Self::GenerationFailure(msg)
    }

    /// Response text without a usable envelope.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Whether the failure moves the lifecycle into `Error`.
    pub fn enters_error_state(&self) -> bool {
        matches!(
            self,
            SubmissionError::GenerationFailure(_) | SubmissionError::MalformedResponse(_)
        )
    }

    /// Label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::EmptyInput => "empty_input",
            SubmissionError::ValidationFailure(_) => "validation_failure",
            SubmissionError::GenerationFailure(_) => "generation_failure",
            SubmissionError::MalformedResponse(_) => "malformed_response",
            SubmissionError::Superseded => "superseded",
        }
    }
}

impl From<GenerationError> for SubmissionError {
    fn from(err: GenerationError) -> Self {
        SubmissionError::generation_failed(err.to_string())
    }
}
