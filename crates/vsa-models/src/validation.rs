//! Reference validation outcome.

use serde::{Deserialize, Serialize};

/// Message shown when a validator rejects a reference without saying why.
pub const DEFAULT_INVALID_MESSAGE: &str = "Invalid YouTube URL";

/// Result of checking a reference before spending a generation call on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// Rejection with a user-visible reason.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
        }
    }

    /// User-visible reason for rejection, falling back to a generic message.
    pub fn error_message(&self) -> Option<String> {
        if self.is_valid {
            return None;
        }
        Some(
            self.error
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INVALID_MESSAGE.to_string()),
        )
    }
}
