//! Parsed analysis body.

use serde::{Deserialize, Serialize};

/// The analysis text extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
}

impl AnalysisResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
