//! Request lifecycle for the video script analyzer.
//!
//! This crate provides:
//! - Reference validation (syntax + oEmbed reachability)
//! - Envelope parsing of model output
//! - The orchestrator that sequences submissions and drops stale results
//! - Structured logging and metrics for submissions

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod validator;

pub use config::{OrchestratorConfig, ValidatorConfig};
pub use error::{SubmissionError, SubmissionResult, UNKNOWN_ERROR_MESSAGE};
pub use logging::RequestLogger;
pub use orchestrator::{
    LanguageChange, NoopObserver, Orchestrator, PresentationObserver, SubmitOutcome, SCHEME_HINT,
};
pub use parser::{parse_analysis, ANALYSIS_FIELD};
pub use validator::{SyntaxValidator, UrlValidator, YoutubeValidator, VALIDATION_FAILED_MESSAGE};
