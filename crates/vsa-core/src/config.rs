//! Orchestrator and validator configuration.

use std::time::Duration;

use vsa_models::Language;

pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Reference validator configuration.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// oEmbed endpoint used for the reachability check
    pub oembed_url: String,
    /// Upper bound for the reachability check
    pub check_timeout: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            oembed_url: DEFAULT_OEMBED_URL.to_string(),
            check_timeout: Duration::from_secs(10),
        }
    }
}

impl ValidatorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            oembed_url: std::env::var("YOUTUBE_OEMBED_URL")
                .unwrap_or_else(|_| DEFAULT_OEMBED_URL.to_string()),
            check_timeout: Duration::from_secs(
                std::env::var("VALIDATOR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

/// Request orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Check references before generating
    pub validate_input_url: bool,
    /// Language selected when the session starts
    pub default_language: Language,
    /// Bound on the generation call; `None` waits indefinitely
    pub generation_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            validate_input_url: true,
            default_language: Language::default(),
            generation_timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl OrchestratorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let timeout_secs: u64 = std::env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        Self {
            validate_input_url: std::env::var("VALIDATE_INPUT_URL")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(Language::new)
                .unwrap_or_default(),
            generation_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }

    /// Skip reference validation; submissions go straight to generation.
    pub fn without_validation(mut self) -> Self {
        self.validate_input_url = false;
        self
    }

    /// Bound the generation call. `None` waits for the call to finish.
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert!(config.validate_input_url);
        assert_eq!(config.default_language.as_str(), "Português (Brasil)");
        assert_eq!(config.generation_timeout, Some(Duration::from_secs(300)));

        let validator = ValidatorConfig::default();
        assert_eq!(validator.oembed_url, "https://www.youtube.com/oembed");
    }

    #[test]
    fn test_builders() {
        let config = OrchestratorConfig::default()
            .without_validation()
            .with_generation_timeout(None);
        assert!(!config.validate_input_url);
        assert_eq!(config.generation_timeout, None);
    }
}
