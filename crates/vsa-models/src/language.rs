//! Output language selection.

use serde::{Deserialize, Serialize};

/// Display name of the language the analysis is written in.
///
/// Free-form: the name is interpolated into the model instruction as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Languages offered by the selector.
    pub const SUPPORTED: [&'static str; 3] = ["Português (Brasil)", "English", "Español"];

    pub const DEFAULT: &'static str = "Português (Brasil)";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is one the selector offers.
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.iter().any(|s| *s == self.0)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Language {
    fn from(name: String) -> Self {
        Self(name)
    }
}
