//! Gemini client for video script analysis.
//!
//! This crate provides:
//! - The `GenerationClient` seam used by the request orchestrator
//! - A reqwest-based `GeminiClient` that sends the video as a file part
//! - The analysis instruction template

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;
pub mod types;

pub use client::{GeminiClient, GenerationClient};
pub use config::GeminiConfig;
pub use error::{GenerationError, GenerationResult};
pub use prompts::analysis_from_video_prompt;
pub use types::GenerateTextRequest;
