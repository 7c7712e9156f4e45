//! Reference validation.
//!
//! A reference is checked for syntax first and then for reachability via the
//! YouTube oEmbed endpoint, which answers 2xx only for public, embeddable
//! videos. Nothing here fails: every problem becomes an invalid result.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;
use vsa_models::{extract_youtube_id, watch_url, ValidationResult, YoutubeIdError, DEFAULT_INVALID_MESSAGE};

use crate::config::ValidatorConfig;

pub const VALIDATION_FAILED_MESSAGE: &str = "Failed to validate URL";

/// Checks a reference before a generation call is spent on it.
#[async_trait]
pub trait UrlValidator: Send + Sync {
    async fn validate(&self, raw: &str) -> ValidationResult;
}

/// Syntax + oEmbed reachability validator for YouTube references.
pub struct YoutubeValidator {
    http: Client,
    config: ValidatorConfig,
}

impl YoutubeValidator {
    /// Create a validator with its own HTTP client.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(ValidatorConfig::from_env())
    }

    async fn check_reachable(&self, video_id: &str) -> ValidationResult {
        let watch = watch_url(video_id);
        let endpoint = match Url::parse_with_params(
            &self.config.oembed_url,
            &[("url", watch.as_str()), ("format", "json")],
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!(oembed_url = %self.config.oembed_url, "Invalid oEmbed endpoint: {}", e);
                return ValidationResult::invalid(VALIDATION_FAILED_MESSAGE);
            }
        };

        let response = self
            .http
            .get(endpoint)
            .timeout(self.config.check_timeout)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!(video_id, "Reference is reachable");
                ValidationResult::valid()
            }
            Ok(resp) => {
                let status = resp.status().as_u16();
                debug!(video_id, status, "oEmbed rejected reference");
                ValidationResult::invalid(status_message(status))
            }
            Err(e) => {
                warn!(video_id, "Reachability check failed: {}", e);
                ValidationResult::invalid(VALIDATION_FAILED_MESSAGE)
            }
        }
    }
}

#[async_trait]
impl UrlValidator for YoutubeValidator {
    async fn validate(&self, raw: &str) -> ValidationResult {
        match extract_youtube_id(raw) {
            Ok(video_id) => self.check_reachable(&video_id).await,
            Err(e) => {
                debug!("Reference failed syntax check: {}", e);
                ValidationResult::invalid(syntax_message(&e))
            }
        }
    }
}

/// Syntax-only validator, for offline sessions.
pub struct SyntaxValidator;

#[async_trait]
impl UrlValidator for SyntaxValidator {
    async fn validate(&self, raw: &str) -> ValidationResult {
        match extract_youtube_id(raw) {
            Ok(_) => ValidationResult::valid(),
            Err(e) => ValidationResult::invalid(syntax_message(&e)),
        }
    }
}

fn syntax_message(err: &YoutubeIdError) -> String {
    if err.is_unsupported_kind() {
        format!("Unsupported video reference: {}", err)
    } else {
        DEFAULT_INVALID_MESSAGE.to_string()
    }
}

fn status_message(status: u16) -> String {
    match status {
        401 | 403 => "Video is private or embedding is disabled".to_string(),
        400 | 404 => "Video not found".to_string(),
        other => format!("Video is not available (HTTP {})", other),
    }
}
