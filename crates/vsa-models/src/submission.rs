//! Submission identity and request types.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Identity token of a submission.
///
/// Ids are issued from a monotonically increasing counter; a larger id is
/// always a newer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id issued after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user-triggered attempt to analyze a reference in a language.
///
/// Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub id: RequestId,
    /// The video reference (trimmed user input)
    pub basis: String,
    pub language: Language,
}

impl SubmissionRequest {
    pub fn new(id: RequestId, basis: impl Into<String>, language: Language) -> Self {
        Self {
            id,
            basis: basis.into(),
            language,
        }
    }

    /// Same reference, new id and language. Used when the language changes
    /// under an already-validated reference.
    pub fn with_language(&self, id: RequestId, language: Language) -> Self {
        Self {
            id,
            basis: self.basis.clone(),
            language,
        }
    }
}
