//! Shared data models for the video script analyzer.
//!
//! This crate provides Serde-serializable types for:
//! - Submissions and their identity tokens
//! - Validation and analysis results
//! - Lifecycle states and published snapshots
//! - YouTube reference parsing

pub mod analysis;
pub mod language;
pub mod lifecycle;
pub mod submission;
pub mod validation;
pub mod youtube;

pub use analysis::AnalysisResult;
pub use language::Language;
pub use lifecycle::{AnalysisSnapshot, LifecycleState};
pub use submission::{RequestId, SubmissionRequest};
pub use validation::{ValidationResult, DEFAULT_INVALID_MESSAGE};
pub use youtube::{embed_url, extract_youtube_id, has_http_scheme, watch_url, YoutubeIdError, YoutubeIdResult};
